use crate::messaging::error::MessagingResult;
use crate::messaging::events::LifecycleEvent;
use crate::messaging::traits::EventDispatcher;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Records emitted events in process
///
/// Clones share the same buffer, so a handle kept by a test observes what the
/// engine emitted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDispatcher {
    events: Arc<Mutex<Vec<LifecycleEvent>>>,
}

impl InMemoryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event emitted so far, in emission order
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().clone()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.event_type() == event_type)
            .cloned()
            .collect()
    }

    pub fn events_for(&self, incident_id: &Uuid) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.incident_id() == *incident_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl EventDispatcher for InMemoryDispatcher {
    async fn emit(&self, event: &LifecycleEvent) -> MessagingResult<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
