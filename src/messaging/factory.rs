use crate::messaging::config::{MessagingBackend, MessagingConfig};
use crate::messaging::error::MessagingResult;
use crate::messaging::kafka::KafkaDispatcher;
use crate::messaging::logging::LoggingDispatcher;
use crate::messaging::memory::InMemoryDispatcher;
use crate::messaging::traits::EventDispatcher;
use std::sync::Arc;

/// Create the process-wide event dispatcher from configuration
pub fn create_dispatcher(config: &MessagingConfig) -> MessagingResult<Arc<dyn EventDispatcher>> {
    if config.enable_metrics {
        crate::messaging::metrics::init_messaging_metrics();
    }

    match config.backend {
        MessagingBackend::Log => {
            tracing::info!("Initializing logging event dispatcher");
            Ok(Arc::new(LoggingDispatcher::new()))
        }
        MessagingBackend::Memory => {
            tracing::info!("Initializing in-memory event dispatcher");
            Ok(Arc::new(InMemoryDispatcher::new()))
        }
        MessagingBackend::Kafka => Ok(Arc::new(KafkaDispatcher::new(
            &config.kafka,
            config.topic.clone(),
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_default_dispatcher() {
        let dispatcher = create_dispatcher(&MessagingConfig::default()).unwrap();
        assert_eq!(dispatcher.backend_name(), "log");
    }

    #[test]
    fn test_create_memory_dispatcher() {
        let config = MessagingConfig {
            backend: MessagingBackend::Memory,
            ..Default::default()
        };
        assert_eq!(create_dispatcher(&config).unwrap().backend_name(), "memory");
    }
}
