//! HTTP binding and use-case layer for the Libris book service.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
pub mod usecase;
