//! Book models and request DTOs.

use libris_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::author::Author;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `books` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Book {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub author_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A book with its author resolved, returned by the get-by-id path.
#[derive(Debug, Clone, Serialize)]
pub struct BookWithAuthor {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub author: Author,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BookWithAuthor {
    /// Attach a resolved author to a book row.
    pub fn from_parts(book: Book, author: Author) -> Self {
        Self {
            id: book.id,
            title: book.title,
            content: book.content,
            author,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Request body for creating or updating a book.
///
/// On create, a client-supplied `id` triggers an existence probe: creating a
/// book whose id already resolves is a conflict.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookInput {
    pub id: Option<DbId>,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
    pub author_id: DbId,
}

/// Query parameters for listing books.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
