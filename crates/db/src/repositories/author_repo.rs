//! Repository for the `authors` table.

use libris_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::author::Author;

/// Column list for `authors` queries.
const AUTHOR_COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides read operations for authors (plus an insert used by tooling
/// and tests; the service itself never creates authors).
pub struct AuthorRepo;

impl AuthorRepo {
    /// Find an author by id.
    pub async fn get_by_id(
        exec: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Author>, sqlx::Error> {
        let query = format!("SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = $1");
        sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .fetch_optional(exec)
            .await
    }

    /// Insert a new author, returning the stored row.
    pub async fn insert(exec: impl PgExecutor<'_>, name: &str) -> Result<Author, sqlx::Error> {
        let query = format!("INSERT INTO authors (name) VALUES ($1) RETURNING {AUTHOR_COLUMNS}");
        sqlx::query_as::<_, Author>(&query)
            .bind(name)
            .fetch_one(exec)
            .await
    }
}
