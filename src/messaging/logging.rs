use crate::messaging::error::MessagingResult;
use crate::messaging::events::LifecycleEvent;
use crate::messaging::traits::EventDispatcher;
use async_trait::async_trait;

/// Writes each event to the log and drops it
#[derive(Debug, Clone, Default)]
pub struct LoggingDispatcher;

impl LoggingDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventDispatcher for LoggingDispatcher {
    async fn emit(&self, event: &LifecycleEvent) -> MessagingResult<()> {
        let payload = serde_json::to_string(event)?;

        tracing::info!(
            event_type = event.event_type(),
            event_id = %event.event_id,
            payload = %payload,
            "Emitting event"
        );

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "log"
    }
}
