/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Deadline bounding each book use-case call, in seconds (default: `2`).
    pub usecase_timeout_secs: u64,
    /// Outbox dispatcher poll interval in milliseconds (default: `500`).
    pub outbox_poll_interval_ms: u64,
    /// Capacity of the bounded channel between a broker subscription and
    /// the mail dispatcher (default: `256`).
    pub mail_queue_capacity: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `USECASE_TIMEOUT_SECS`    | `2`                     |
    /// | `OUTBOX_POLL_INTERVAL_MS` | `500`                   |
    /// | `MAIL_QUEUE_CAPACITY`     | `256`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let usecase_timeout_secs: u64 = std::env::var("USECASE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("USECASE_TIMEOUT_SECS must be a valid u64");

        let outbox_poll_interval_ms: u64 = std::env::var("OUTBOX_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "500".into())
            .parse()
            .expect("OUTBOX_POLL_INTERVAL_MS must be a valid u64");

        let mail_queue_capacity: usize = std::env::var("MAIL_QUEUE_CAPACITY")
            .unwrap_or_else(|_| "256".into())
            .parse()
            .expect("MAIL_QUEUE_CAPACITY must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            usecase_timeout_secs,
            outbox_poll_interval_ms,
            mail_queue_capacity,
        }
    }
}
