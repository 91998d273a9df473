//! Incident lifecycle engine
//!
//! Owns the status state machine, keeps the incident cache consistent with the
//! repository, and emits lifecycle events after durable mutations.
//!
//! Within one mutating call the order is fixed:
//!
//! ```text
//! repository write ──▶ cache invalidation ──▶ event emission
//! ```
//!
//! A failed repository write aborts the call before either later step runs.
//! Cache and event failures are logged and counted but never fail a call whose
//! write already succeeded.

mod engine;
mod metrics;

pub use engine::IncidentLifecycleEngine;
pub use metrics::{init_lifecycle_metrics, measure_operation, LIFECYCLE_METRICS};
