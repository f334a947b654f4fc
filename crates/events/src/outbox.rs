//! Outbox dispatcher.
//!
//! [`OutboxDispatcher`] runs as a background task, polling the
//! `outbox_events` table for rows enqueued by the CRUD path and publishing
//! each one to the broker. Keeping the publish out of the request path means
//! a broker fault can never turn a committed mutation into a user-visible
//! error; an unpublished row simply stays eligible for the next tick.
//! Delivery remains best-effort: there is no acknowledgement from consumers
//! and no exactly-once guarantee.

use std::sync::Arc;
use std::time::Duration;

use libris_db::repositories::OutboxRepo;
use libris_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::broker::Broker;
use crate::event::Event;

/// How many rows to drain per tick.
const DRAIN_BATCH_SIZE: i64 = 64;

/// Background service draining the notification outbox into the broker.
pub struct OutboxDispatcher {
    pool: DbPool,
    broker: Arc<Broker>,
    poll_interval: Duration,
}

impl OutboxDispatcher {
    /// Create a dispatcher with the given pool, broker, and poll interval.
    pub fn new(pool: DbPool, broker: Arc<Broker>, poll_interval: Duration) -> Self {
        Self {
            pool,
            broker,
            poll_interval,
        }
    }

    /// Run the drain loop.
    ///
    /// Polls on a fixed interval and exits gracefully when the provided
    /// [`CancellationToken`] is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Outbox dispatcher cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.drain_once().await {
                        tracing::error!(error = %e, "Failed to drain outbox");
                    }
                }
            }
        }
    }

    /// Drain one batch of unpublished rows, returning how many were
    /// published.
    pub async fn drain_once(&self) -> Result<usize, sqlx::Error> {
        let rows = OutboxRepo::list_unpublished(&self.pool, DRAIN_BATCH_SIZE).await?;
        let mut published = 0;

        for row in rows {
            let event = Event {
                subject: row.subject,
                content: row.content,
            };

            match self.broker.publish(&event) {
                Ok(()) => {
                    OutboxRepo::mark_published(&self.pool, row.id).await?;
                    published += 1;
                }
                Err(e) => {
                    // Leave the row unpublished; it is retried next tick.
                    tracing::error!(
                        error = %e,
                        outbox_id = row.id,
                        subject = %event.subject,
                        "Failed to publish outbox event"
                    );
                    OutboxRepo::record_failure(&self.pool, row.id).await?;
                }
            }
        }

        if published > 0 {
            tracing::debug!(published, "Drained outbox batch");
        }

        Ok(published)
    }
}
