//! Lifecycle event streaming
//!
//! Mutating engine operations hand an immutable [`LifecycleEvent`] to an
//! [`EventDispatcher`]. Delivery is fire-and-forget from the engine's point of
//! view: a failed or slow dispatch is logged and dropped, never rolled back
//! into the request.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │         Incident Lifecycle Engine               │
//! │  1. repository write                            │
//! │  2. cache invalidation                          │
//! │  3. emit(event) ────────────────┐               │
//! └─────────────────────────────────┼───────────────┘
//!                                   ▼
//! ┌─────────────────────────────────────────────────┐
//! │      EventDispatcher trait                      │
//! └─────────────────────────────────────────────────┘
//!      │                 │                   │
//!      ▼                 ▼                   ▼
//! ┌──────────┐    ┌──────────────┐    ┌──────────────┐
//! │ Logging  │    │  In-memory   │    │    Kafka     │
//! │ (no-op)  │    │ (recording)  │    │ (durable)    │
//! └──────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use incident_lifecycle::messaging::{EventDispatcher, LifecycleEvent, LoggingDispatcher};
//! use incident_lifecycle::models::Incident;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = LoggingDispatcher::new();
//! let incident = Incident::open("DB outage".to_string(), "replica down".to_string());
//!
//! dispatcher
//!     .emit(&LifecycleEvent::incident_created("incident_service", &incident))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod events;
mod factory;
mod kafka;
mod logging;
mod memory;
mod metrics;
mod traits;

pub use config::{KafkaConfig, MessagingBackend, MessagingConfig};
pub use error::{MessagingError, MessagingResult};
pub use events::{EventPayload, LifecycleEvent};
pub use factory::create_dispatcher;
pub use kafka::KafkaDispatcher;
pub use logging::LoggingDispatcher;
pub use memory::InMemoryDispatcher;
pub use metrics::{init_messaging_metrics, MESSAGING_METRICS};
pub use traits::EventDispatcher;
