//! Shared domain types and the error taxonomy for the Libris service.
//!
//! This crate has no internal dependencies so it can be used by the
//! repository layer, the notification pipeline, and the API alike.

pub mod error;
pub mod types;

pub use error::CoreError;
