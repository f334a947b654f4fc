use libris_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `outbox_events` table.
///
/// `subject` holds the routing key of the notification event; `content` is
/// the snapshot of the affected record taken at enqueue time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OutboxEvent {
    pub id: DbId,
    pub subject: String,
    pub content: String,
    pub attempts: i32,
    pub enqueued_at: Timestamp,
    pub published_at: Option<Timestamp>,
}
