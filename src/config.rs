use crate::auth::Role;
use crate::messaging::MessagingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Repository backend configuration
    #[serde(default)]
    pub state: StateConfig,

    /// Cache backend configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Event dispatcher configuration
    #[serde(default)]
    pub messaging: MessagingConfig,

    /// Engine timeouts
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Bearer token table
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/local.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (INCIDENT_LIFECYCLE__SECTION__KEY)
            .add_source(
                config::Environment::with_prefix("INCIDENT_LIFECYCLE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateConfig {
    /// Repository backend type
    #[serde(default)]
    pub backend: StateBackend,

    /// Path for the embedded database (sled)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StateBackend {
    #[default]
    Memory,
    Sled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Physical cache backend
    #[serde(default)]
    pub backend: CacheBackendKind,

    /// Redis connection string
    pub redis_url: Option<String>,

    /// Prefix applied to every physical key; empty disables it
    #[serde(default = "default_key_prefix")]
    pub key_prefix: Option<String>,

    /// Namespace for incident snapshots
    #[serde(default = "default_cache_namespace")]
    pub namespace: String,

    /// Snapshot time-to-live (seconds)
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// Maximum entries held by the in-memory backend
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::default(),
            redis_url: None,
            key_prefix: default_key_prefix(),
            namespace: default_cache_namespace(),
            ttl_secs: default_cache_ttl(),
            max_capacity: default_cache_capacity(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackendKind {
    #[default]
    Memory,
    Redis,
}

/// Bounds on every collaborator call made by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Repository call timeout (milliseconds)
    #[serde(default = "default_repository_timeout")]
    pub repository_timeout_ms: u64,

    /// Cache call timeout (milliseconds)
    #[serde(default = "default_cache_timeout")]
    pub cache_timeout_ms: u64,

    /// Event emission timeout (milliseconds)
    #[serde(default = "default_event_timeout")]
    pub event_timeout_ms: u64,
}

impl LifecycleConfig {
    pub fn repository_timeout(&self) -> Duration {
        Duration::from_millis(self.repository_timeout_ms)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    pub fn event_timeout(&self) -> Duration {
        Duration::from_millis(self.event_timeout_ms)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            repository_timeout_ms: default_repository_timeout(),
            cache_timeout_ms: default_cache_timeout(),
            event_timeout_ms: default_event_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEntry {
    pub token: String,
    pub user_id: String,
    pub role: Role,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_key_prefix() -> Option<String> {
    Some("incident_service".to_string())
}

fn default_cache_namespace() -> String {
    "incident".to_string()
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_repository_timeout() -> u64 {
    5_000
}

fn default_cache_timeout() -> u64 {
    250
}

fn default_event_timeout() -> u64 {
    1_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "incident-lifecycle".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_http_port(), 8080);
        assert_eq!(default_cache_ttl(), 300);
        assert_eq!(default_cache_namespace(), "incident");
        assert_eq!(
            CacheConfig::default().key_prefix.as_deref(),
            Some("incident_service")
        );
        assert_eq!(default_log_level(), "info");
        assert!(default_true());
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.state.backend, StateBackend::Memory);
        assert_eq!(config.cache.backend, CacheBackendKind::Memory);
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.cache.key_prefix.as_deref(), Some("incident_service"));
        assert_eq!(config.cache.namespace, "incident");
        assert_eq!(config.messaging.topic, "incident.events");
        assert_eq!(config.lifecycle.cache_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_token_entry_role_parsing() {
        let entry: TokenEntry = serde_json::from_str(
            r#"{"token": "abc", "user_id": "u-1", "role": "engineer"}"#,
        )
        .unwrap();
        assert_eq!(entry.role, Role::Engineer);
    }
}
