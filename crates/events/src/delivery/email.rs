//! Email delivery via authenticated SMTP submission.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport. The Subject
//! header carries the event's routing key (e.g. `"update.sql"`) and the
//! body is the single content line. Configuration is loaded from
//! environment variables; if `SMTP_HOST` or `MAIL_TO` is not set,
//! [`EmailConfig::from_env`] returns `None` and the mail pipeline should
//! not be started.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::dispatcher::MailTransport;
use crate::event::Event;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@libris.local";

/// Configuration for the SMTP delivery transport.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Recipient of every notification email.
    pub to_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` or `MAIL_TO` is not set, signalling
    /// that email delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                |
    /// |-----------------|----------|------------------------|
    /// | `SMTP_HOST`     | yes      | —                      |
    /// | `MAIL_TO`       | yes      | —                      |
    /// | `SMTP_PORT`     | no       | `587`                  |
    /// | `SMTP_FROM`     | no       | `noreply@libris.local` |
    /// | `SMTP_USER`     | no       | —                      |
    /// | `SMTP_PASSWORD` | no       | —                      |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        let to_address = std::env::var("MAIL_TO").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            to_address,
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends notification emails for events via SMTP.
pub struct EmailDelivery {
    from_address: String,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailDelivery {
    /// Build the long-lived SMTP transport from the given configuration.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from_address: config.from_address.clone(),
            mailer: builder.build(),
        })
    }

    /// Send one notification email for the given event.
    pub async fn send(&self, to_email: &str, event: &Event) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(event.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(event.content.clone())
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.mailer.send(email).await?;

        tracing::info!(to = to_email, subject = %event.subject, "Notification email sent");
        Ok(())
    }
}

#[async_trait]
impl MailTransport for EmailDelivery {
    async fn deliver(&self, to: &str, event: &Event) -> Result<(), EmailError> {
        self.send(to, event).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
