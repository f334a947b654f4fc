use std::sync::Arc;

use crate::config::ServerConfig;
use crate::usecase::books::BookUsecase;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: libris_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Book use-case orchestrator.
    pub books: Arc<BookUsecase>,
}
