//! Messaging trait abstractions

use crate::messaging::error::MessagingResult;
use crate::messaging::events::LifecycleEvent;
use async_trait::async_trait;

/// Publishes lifecycle events to a topic or stream.
///
/// `emit` returns once the event is handed to the transport; it does not wait
/// for broker acknowledgement.
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    /// Hand one event to the transport
    async fn emit(&self, event: &LifecycleEvent) -> MessagingResult<()>;

    /// Short backend label used in logs and metrics
    fn backend_name(&self) -> &'static str;
}
