//! Libris notification pipeline.
//!
//! Building blocks for the CRUD notification flow:
//!
//! - [`Event`] / [`EventType`] — the notification payload and its closed
//!   set of routing keys.
//! - [`Broker`] — long-lived in-process topic broker carrying encoded
//!   event payloads between publisher and consumers.
//! - [`OutboxDispatcher`] — background service draining the database
//!   outbox into the broker.
//! - [`MailDispatcher`] / [`delivery`] — consumer that turns inbound
//!   payloads into outbound SMTP email.

pub mod broker;
pub mod delivery;
pub mod dispatcher;
pub mod event;
pub mod outbox;

pub use broker::{Broker, BrokerConfig, BrokerError, Subscription};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use dispatcher::{MailDispatcher, MailTransport};
pub use event::{Event, EventType};
pub use outbox::OutboxDispatcher;
