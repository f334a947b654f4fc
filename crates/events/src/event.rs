//! Notification event model and transport encoding.
//!
//! An [`Event`] is built synchronously inside the triggering operation,
//! encoded immediately, and discarded after transmission. The wire form is
//! a UTF-8 JSON object `{"subject": ..., "content": ...}`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

/// Closed enumeration of the CRUD operations that trigger a notification.
///
/// Each variant maps to a fixed routing key used as the broker topic and as
/// the email subject line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Fetch,
    Add,
    Update,
    Delete,
    GetById,
}

impl EventType {
    /// The fixed routing key for this event type.
    pub fn routing_key(self) -> &'static str {
        match self {
            EventType::Fetch => "fetch.sql",
            EventType::Add => "add.sql",
            EventType::Update => "update.sql",
            EventType::Delete => "delete.sql",
            EventType::GetById => "get.by.id.sql",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.routing_key())
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// Immutable notification payload.
///
/// `content` is a snapshot of the affected record taken at the moment of
/// the triggering call; later mutation of the record never changes an
/// already-queued event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub subject: String,
    pub content: String,
}

impl Event {
    /// Build an event for the given operation. The subject is always set
    /// here, before the event can reach the broker.
    pub fn new(subject: EventType, content: impl Into<String>) -> Self {
        Self {
            subject: subject.routing_key().to_string(),
            content: content.into(),
        }
    }

    /// Whether this is the empty event produced by a failed decode.
    pub fn is_empty(&self) -> bool {
        self.subject.is_empty() && self.content.is_empty()
    }

    /// Encode to the JSON wire form.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode from the wire form.
    ///
    /// Malformed payloads (including legacy raw-string bodies) degrade to
    /// the empty event instead of erroring, so a bad message can never take
    /// down a consumer loop.
    pub fn decode(payload: &[u8]) -> Event {
        match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed event payload, degrading to empty event");
                Event::default()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
