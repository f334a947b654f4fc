//! Mail dispatcher: the consumer end of the notification pipeline.
//!
//! [`MailDispatcher`] drains the byte sink fed by a broker
//! [`Subscription`](crate::broker::Subscription), decodes each payload to an
//! [`Event`], and submits one email per event. Transport failures are
//! logged; the drain loop never terminates on a send failure. There is no
//! batching, throttling, or backoff.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::delivery::email::EmailError;
use crate::event::Event;

/// Seam between the drain loop and the SMTP transport.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Submit one email for the given event.
    async fn deliver(&self, to: &str, event: &Event) -> Result<(), EmailError>;
}

/// Consumes inbound broker payloads and turns them into outbound email.
pub struct MailDispatcher<M> {
    mailer: M,
    recipient: String,
}

impl<M: MailTransport> MailDispatcher<M> {
    /// Create a dispatcher sending every notification to `recipient`.
    pub fn new(mailer: M, recipient: impl Into<String>) -> Self {
        Self {
            mailer,
            recipient: recipient.into(),
        }
    }

    /// Run the drain loop until the sink closes.
    ///
    /// Malformed payloads degrade to the empty event and still pass through
    /// the transport as a no-op email; they never error out of the loop.
    pub async fn run(self, mut sink: mpsc::Receiver<Vec<u8>>) {
        while let Some(payload) = sink.recv().await {
            let event = Event::decode(&payload);

            if let Err(e) = self.mailer.deliver(&self.recipient, &event).await {
                tracing::error!(
                    error = %e,
                    subject = %event.subject,
                    "Failed to send notification email"
                );
            }
        }

        tracing::info!("Payload sink closed, mail dispatcher shutting down");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
