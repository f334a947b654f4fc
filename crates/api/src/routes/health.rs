use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// GET /health
///
/// Reports `ok` when the database answers a ping, `degraded` otherwise.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match libris_db::health_check(&state.pool).await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Health check database ping failed");
            "degraded"
        }
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
