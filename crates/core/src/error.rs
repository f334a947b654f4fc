use crate::types::DbId;

/// Domain-level error taxonomy.
///
/// Repository-path errors surface to the caller unchanged; notification-path
/// faults (broker, mail) are logged where they occur and never reach this
/// type.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Deadline exceeded during {operation}")]
    Timeout { operation: &'static str },

    #[error("Internal error: {0}")]
    Internal(String),
}
