//! Incident lifecycle service
//!
//! Validates incident status transitions, serves reads through a cache-aside
//! layer, and publishes lifecycle events after durable writes.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod messaging;
pub mod metrics;
pub mod models;
pub mod state;

pub use error::{AppError, Result};
pub use lifecycle::IncidentLifecycleEngine;
