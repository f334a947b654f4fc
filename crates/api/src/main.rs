use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libris_api::config::ServerConfig;
use libris_api::usecase::books::BookUsecase;
use libris_api::{routes, state};
use libris_events::{
    Broker, BrokerConfig, EmailConfig, EmailDelivery, MailDispatcher, OutboxDispatcher,
};

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "libris_api=debug,libris_events=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = libris_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    libris_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    libris_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Broker ---
    let broker = Arc::new(Broker::new(BrokerConfig::from_env()));
    tracing::info!("Notification broker created");

    // Background services share one cancellation token, cancelled on
    // shutdown.
    let cancel = CancellationToken::new();

    // Spawn the outbox dispatcher (publishes staged events to the broker).
    let outbox_dispatcher = OutboxDispatcher::new(
        pool.clone(),
        Arc::clone(&broker),
        Duration::from_millis(config.outbox_poll_interval_ms),
    );
    let outbox_cancel = cancel.clone();
    tokio::spawn(async move {
        outbox_dispatcher.run(outbox_cancel).await;
    });

    // Spawn the mail pipeline (broker subscription -> mail dispatcher)
    // when SMTP is configured.
    match EmailConfig::from_env() {
        Some(email_config) => match EmailDelivery::new(&email_config) {
            Ok(delivery) => {
                let (tx, rx) = mpsc::channel(config.mail_queue_capacity);
                let subscription = broker.subscribe(&[]);
                tokio::spawn(subscription.run(tx, cancel.clone()));

                let dispatcher = MailDispatcher::new(delivery, email_config.to_address.clone());
                tokio::spawn(dispatcher.run(rx));
                tracing::info!(to = %email_config.to_address, "Mail dispatcher started");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to build SMTP transport, mail dispatch disabled");
            }
        },
        None => {
            tracing::info!("SMTP not configured, mail dispatch disabled");
        }
    }

    // --- Use-case layer ---
    let books = Arc::new(BookUsecase::new(
        pool.clone(),
        Duration::from_secs(config.usecase_timeout_secs),
    ));

    // --- CORS ---
    let cors = build_cors_layer(&config);

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        books,
    };

    // --- Request ID header name ---
    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    let app = Router::new()
        // Health check at root level (not under /api/v1).
        .merge(routes::health::router())
        // API v1 routes.
        .nest("/api/v1", routes::api_routes())
        // -- Middleware stack (applied bottom-up) --
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be a valid IP address"),
        config.port,
    );
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    let shutdown_cancel = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
            shutdown_cancel.cancel();
        })
        .await
        .expect("Server error");

    tracing::info!("Server stopped");
}

/// Build the CORS layer from the configured origins.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
