//! Long-lived in-process topic broker.
//!
//! One [`Broker`] is created per process from an injected [`BrokerConfig`]
//! and shared via `Arc`. Publishers hand it encoded [`Event`] payloads;
//! consumers obtain a [`Subscription`] bound to a set of routing keys and
//! drive it from a dedicated task. Delivery is best-effort: with no active
//! subscription a published payload is dropped, and a lagging subscription
//! loses the oldest buffered payloads.

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::event::Event;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// Default exchange name, matching the CRUD notification topology.
const DEFAULT_EXCHANGE: &str = "crud_exchange";

// ---------------------------------------------------------------------------
// Config / errors
// ---------------------------------------------------------------------------

/// Configuration injected into the broker constructor.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Logical exchange name, used for log correlation.
    pub exchange: String,
    /// Broadcast buffer capacity.
    pub capacity: usize,
}

impl BrokerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Variable          | Default         |
    /// |-------------------|-----------------|
    /// | `BROKER_EXCHANGE` | `crud_exchange` |
    /// | `BROKER_CAPACITY` | `1024`          |
    pub fn from_env() -> Self {
        Self {
            exchange: std::env::var("BROKER_EXCHANGE")
                .unwrap_or_else(|_| DEFAULT_EXCHANGE.to_string()),
            capacity: std::env::var("BROKER_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            exchange: DEFAULT_EXCHANGE.to_string(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Error type for publish failures.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// The event could not be encoded to its wire form.
    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Broker
// ---------------------------------------------------------------------------

/// A payload in flight on the exchange.
#[derive(Debug, Clone)]
struct Delivery {
    routing_key: String,
    payload: Vec<u8>,
}

/// In-process topic broker carrying encoded event payloads.
pub struct Broker {
    exchange: String,
    sender: broadcast::Sender<Delivery>,
}

impl Broker {
    /// Create a broker from an explicit configuration value.
    pub fn new(config: BrokerConfig) -> Self {
        let (sender, _) = broadcast::channel(config.capacity);
        Self {
            exchange: config.exchange,
            sender,
        }
    }

    /// Publish an event, routed by its subject.
    ///
    /// Returns an error only when the event cannot be encoded; having zero
    /// active subscriptions silently drops the payload.
    pub fn publish(&self, event: &Event) -> Result<(), BrokerError> {
        let payload = event.encode()?;
        let delivery = Delivery {
            routing_key: event.subject.clone(),
            payload,
        };
        tracing::debug!(
            exchange = %self.exchange,
            routing_key = %delivery.routing_key,
            "Publishing event"
        );
        // SendError only means there are zero receivers.
        let _ = self.sender.send(delivery);
        Ok(())
    }

    /// Bind a subscription to the given routing keys.
    ///
    /// An empty key list binds every key. The subscription only receives
    /// payloads published after this call.
    pub fn subscribe(&self, binding_keys: &[&str]) -> Subscription {
        Subscription {
            exchange: self.exchange.clone(),
            receiver: self.sender.subscribe(),
            binding_keys: binding_keys.iter().map(|k| k.to_string()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A stoppable binding streaming matching payloads into a bounded sink.
pub struct Subscription {
    exchange: String,
    receiver: broadcast::Receiver<Delivery>,
    binding_keys: Vec<String>,
}

impl Subscription {
    fn matches(&self, routing_key: &str) -> bool {
        self.binding_keys.is_empty() || self.binding_keys.iter().any(|k| k == routing_key)
    }

    /// Stream matching payloads into `sink` until cancelled.
    ///
    /// Long-running; drive this from a dedicated spawned task, never inline
    /// with a request. The loop exits when the token is cancelled, the sink
    /// is dropped, or the broker is dropped. The bounded sink applies
    /// backpressure to the drain rather than to publishers.
    pub async fn run(mut self, sink: mpsc::Sender<Vec<u8>>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(exchange = %self.exchange, "Subscription cancelled");
                    break;
                }
                msg = self.receiver.recv() => match msg {
                    Ok(delivery) => {
                        if !self.matches(&delivery.routing_key) {
                            continue;
                        }
                        if sink.send(delivery.payload).await.is_err() {
                            tracing::info!(
                                exchange = %self.exchange,
                                "Subscription sink dropped, stopping"
                            );
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            exchange = %self.exchange,
                            skipped = n,
                            "Subscription lagged, payloads were dropped"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!(exchange = %self.exchange, "Broker dropped, subscription stopping");
                        break;
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use std::time::Duration;

    fn broker() -> Broker {
        Broker::new(BrokerConfig::default())
    }

    #[tokio::test]
    async fn subscription_receives_published_payload() {
        let broker = broker();
        let subscription = broker.subscribe(&[]);
        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(subscription.run(tx, cancel.clone()));

        let event = Event::new(EventType::Add, "fresh content");
        broker.publish(&event).expect("publish should succeed");

        let payload = rx.recv().await.expect("should receive the payload");
        assert_eq!(Event::decode(&payload), event);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn binding_keys_filter_deliveries() {
        let broker = broker();
        let subscription = broker.subscribe(&[EventType::Delete.routing_key()]);
        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        tokio::spawn(subscription.run(tx, cancel.clone()));

        broker.publish(&Event::new(EventType::Add, "ignored")).unwrap();
        broker.publish(&Event::new(EventType::Delete, "kept")).unwrap();

        let payload = rx.recv().await.expect("should receive the matching payload");
        let event = Event::decode(&payload);
        assert_eq!(event.subject, "delete.sql");
        assert_eq!(event.content, "kept");

        cancel.cancel();
    }

    #[test]
    fn publish_with_no_subscribers_is_ok() {
        let broker = broker();
        broker
            .publish(&Event::new(EventType::Fetch, "dropped"))
            .expect("publish must not fail without subscribers");
    }

    #[tokio::test]
    async fn cancellation_stops_the_subscription() {
        let broker = broker();
        let subscription = broker.subscribe(&[]);
        let (tx, _rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(subscription.run(tx, cancel.clone()));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("subscription should stop promptly")
            .unwrap();
    }

    #[tokio::test]
    async fn dropping_the_broker_stops_the_subscription() {
        let broker = broker();
        let subscription = broker.subscribe(&[]);
        let (tx, _rx) = mpsc::channel(16);
        let handle = tokio::spawn(subscription.run(tx, CancellationToken::new()));

        drop(broker);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("subscription should stop when the broker is dropped")
            .unwrap();
    }
}
