//! Kafka event dispatcher

use crate::messaging::config::KafkaConfig;
use crate::messaging::error::{MessagingError, MessagingResult};
use crate::messaging::events::LifecycleEvent;
use crate::messaging::traits::EventDispatcher;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::sync::Arc;

/// Publishes lifecycle events to a Kafka topic
///
/// Records are keyed by `event_id`. `emit` only enqueues the record in the
/// producer; the delivery report is awaited on a background task and logged.
pub struct KafkaDispatcher {
    producer: Arc<FutureProducer>,
    topic: String,
}

impl KafkaDispatcher {
    /// Create a new Kafka dispatcher
    pub fn new(config: &KafkaConfig, topic: impl Into<String>) -> MessagingResult<Self> {
        let topic = topic.into();
        if topic.is_empty() {
            return Err(MessagingError::ConfigurationError(
                "Kafka dispatcher requires a topic".to_string(),
            ));
        }

        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("client.id", &config.client_id)
            .set("compression.type", &config.compression_type)
            .set("message.timeout.ms", config.message_timeout_ms.to_string())
            .set("retries", config.retries.to_string());

        if config.enable_sasl {
            if let (Some(mechanism), Some(username), Some(password)) = (
                &config.sasl_mechanism,
                &config.sasl_username,
                &config.sasl_password,
            ) {
                client_config
                    .set("security.protocol", "SASL_SSL")
                    .set("sasl.mechanism", mechanism)
                    .set("sasl.username", username)
                    .set("sasl.password", password);
            }
        }

        let producer: FutureProducer = client_config.create().map_err(|e| {
            MessagingError::ConnectionFailed(format!("Kafka producer creation failed: {}", e))
        })?;

        tracing::info!(
            bootstrap_servers = %config.bootstrap_servers,
            topic = %topic,
            "Initialized Kafka event dispatcher"
        );

        Ok(Self {
            producer: Arc::new(producer),
            topic,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl EventDispatcher for KafkaDispatcher {
    async fn emit(&self, event: &LifecycleEvent) -> MessagingResult<()> {
        let payload = serde_json::to_string(event)?;
        let key = event.event_id.to_string();

        let record: FutureRecord<'_, str, str> =
            FutureRecord::to(&self.topic).key(key.as_str()).payload(payload.as_str());

        let delivery = self.producer.send_result(record).map_err(|(e, _)| {
            MessagingError::PublishFailed(format!("Kafka enqueue failed: {}", e))
        })?;

        let event_id = event.event_id;
        let event_type = event.event_type();
        tokio::spawn(async move {
            match delivery.await {
                Ok(Ok((partition, offset))) => {
                    tracing::debug!(%event_id, event_type, partition, offset, "Event delivered to Kafka");
                }
                Ok(Err((e, _))) => {
                    tracing::warn!(%event_id, event_type, error = %e, "Kafka delivery failed");
                }
                Err(_) => {
                    tracing::warn!(%event_id, event_type, "Kafka delivery report dropped");
                }
            }
        });

        tracing::info!(
            event_type,
            event_id = %event.event_id,
            topic = %self.topic,
            "Emitting event to Kafka"
        );

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "kafka"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kafka_config() {
        let config = KafkaConfig::default();
        assert_eq!(config.client_id, "incident-lifecycle");
        assert_eq!(config.compression_type, "snappy");
    }

    #[test]
    fn test_empty_topic_rejected() {
        let result = KafkaDispatcher::new(&KafkaConfig::default(), "");
        assert!(matches!(result, Err(MessagingError::ConfigurationError(_))));
    }
}
