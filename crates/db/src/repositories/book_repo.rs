//! Repository for the `books` table.
//!
//! All operations take `impl PgExecutor` so mutations can run inside the
//! same transaction as their outbox enqueue.

use libris_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::book::Book;

/// Column list for `books` queries.
const BOOK_COLUMNS: &str = "id, title, content, author_id, created_at, updated_at";

/// Provides read/write operations for books.
pub struct BookRepo;

impl BookRepo {
    /// List books ordered by creation time.
    pub async fn fetch(
        exec: impl PgExecutor<'_>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Book>, sqlx::Error> {
        let query =
            format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Book>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(exec)
            .await
    }

    /// Find a book by id. Absence is `None`, never a zero-value row.
    pub async fn get_by_id(
        exec: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Book>, sqlx::Error> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(exec)
            .await
    }

    /// Insert a new book, returning the stored row.
    pub async fn insert(
        exec: impl PgExecutor<'_>,
        title: &str,
        content: &str,
        author_id: DbId,
    ) -> Result<Book, sqlx::Error> {
        let query = format!(
            "INSERT INTO books (title, content, author_id) \
             VALUES ($1, $2, $3) \
             RETURNING {BOOK_COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(title)
            .bind(content)
            .bind(author_id)
            .fetch_one(exec)
            .await
    }

    /// Update a book's mutable fields, returning the updated row or `None`
    /// if no row matched.
    pub async fn update(
        exec: impl PgExecutor<'_>,
        id: DbId,
        title: &str,
        content: &str,
        author_id: DbId,
    ) -> Result<Option<Book>, sqlx::Error> {
        let query = format!(
            "UPDATE books \
             SET title = $2, content = $3, author_id = $4, updated_at = now() \
             WHERE id = $1 \
             RETURNING {BOOK_COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(title)
            .bind(content)
            .bind(author_id)
            .fetch_optional(exec)
            .await
    }

    /// Delete a book by id. Returns whether a row was removed.
    pub async fn delete(exec: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(exec)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
