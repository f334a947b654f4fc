//! Repository for the `outbox_events` table.

use libris_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::outbox::OutboxEvent;

/// Column list for `outbox_events` queries.
const OUTBOX_COLUMNS: &str = "id, subject, content, attempts, enqueued_at, published_at";

/// Provides enqueue and drain operations for the notification outbox.
pub struct OutboxRepo;

impl OutboxRepo {
    /// Enqueue a notification event.
    ///
    /// Callers on the mutation path pass the transaction of the triggering
    /// write so the enqueue is atomic with it.
    pub async fn enqueue(
        exec: impl PgExecutor<'_>,
        subject: &str,
        content: &str,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar("INSERT INTO outbox_events (subject, content) VALUES ($1, $2) RETURNING id")
            .bind(subject)
            .bind(content)
            .fetch_one(exec)
            .await
    }

    /// List unpublished rows, oldest first.
    pub async fn list_unpublished(
        exec: impl PgExecutor<'_>,
        limit: i64,
    ) -> Result<Vec<OutboxEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {OUTBOX_COLUMNS} FROM outbox_events \
             WHERE published_at IS NULL \
             ORDER BY enqueued_at, id \
             LIMIT $1"
        );
        sqlx::query_as::<_, OutboxEvent>(&query)
            .bind(limit)
            .fetch_all(exec)
            .await
    }

    /// Stamp a row as published.
    pub async fn mark_published(exec: impl PgExecutor<'_>, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE outbox_events SET published_at = now() WHERE id = $1")
            .bind(id)
            .execute(exec)
            .await?;
        Ok(())
    }

    /// Record a failed publish attempt; the row stays eligible for retry.
    pub async fn record_failure(exec: impl PgExecutor<'_>, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE outbox_events SET attempts = attempts + 1 WHERE id = $1")
            .bind(id)
            .execute(exec)
            .await?;
        Ok(())
    }
}
