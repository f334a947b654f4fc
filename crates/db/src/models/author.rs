use libris_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `authors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Author {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
