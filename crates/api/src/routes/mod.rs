pub mod books;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /books          GET list, POST create
/// /books/{id}     GET, PUT, DELETE
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/books", books::router())
}
