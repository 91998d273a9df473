//! Messaging configuration

use serde::{Deserialize, Serialize};

/// Event dispatcher backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessagingBackend {
    /// Log each event and drop it
    #[default]
    Log,
    /// Keep events in process (tests, local runs)
    Memory,
    /// Kafka - durable event log
    Kafka,
}

/// Kafka configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    /// Kafka bootstrap servers
    pub bootstrap_servers: String,

    /// Client ID
    pub client_id: String,

    /// Enable SASL authentication
    pub enable_sasl: bool,

    /// SASL mechanism (PLAIN, SCRAM-SHA-256, SCRAM-SHA-512)
    pub sasl_mechanism: Option<String>,

    /// SASL username
    pub sasl_username: Option<String>,

    /// SASL password
    pub sasl_password: Option<String>,

    /// Compression type (none, gzip, snappy, lz4, zstd)
    pub compression_type: String,

    /// Message timeout in milliseconds
    pub message_timeout_ms: u64,

    /// Number of retries
    pub retries: u32,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:9092".to_string(),
            client_id: "incident-lifecycle".to_string(),
            enable_sasl: false,
            sasl_mechanism: None,
            sasl_username: None,
            sasl_password: None,
            compression_type: "snappy".to_string(),
            message_timeout_ms: 30000,
            retries: 3,
        }
    }
}

/// Main messaging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Backend to use
    pub backend: MessagingBackend,

    /// Topic lifecycle events are published to
    pub topic: String,

    /// Value of the `source` field stamped on every event
    pub source: String,

    /// Kafka configuration
    pub kafka: KafkaConfig,

    /// Enable metrics
    pub enable_metrics: bool,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            backend: MessagingBackend::Log,
            topic: "incident.events".to_string(),
            source: "incident_service".to_string(),
            kafka: KafkaConfig::default(),
            enable_metrics: true,
        }
    }
}
