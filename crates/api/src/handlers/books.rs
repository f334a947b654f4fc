//! Handlers for the book resource.
//!
//! Thin request→use-case mapping: validation and parameter extraction
//! happen here, all orchestration (deadlines, probes, event staging) in
//! [`BookUsecase`](crate::usecase::books::BookUsecase).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use libris_core::types::DbId;
use libris_db::models::book::{BookInput, BookListParams};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/books
///
/// List books with optional `limit`/`offset` query parameters.
pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<BookListParams>,
) -> AppResult<impl IntoResponse> {
    let books = state
        .books
        .fetch(params.limit.unwrap_or(0), params.offset.unwrap_or(0))
        .await?;

    Ok(Json(DataResponse { data: books }))
}

/// GET /api/v1/books/{id}
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let book = state.books.get_by_id(id).await?;

    Ok(Json(DataResponse { data: book }))
}

/// POST /api/v1/books
pub async fn create_book(
    State(state): State<AppState>,
    Json(input): Json<BookInput>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let book = state.books.add(input).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: book })))
}

/// PUT /api/v1/books/{id}
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<BookInput>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let book = state.books.update(id, input).await?;

    Ok(Json(DataResponse { data: book }))
}

/// DELETE /api/v1/books/{id}
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.books.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
