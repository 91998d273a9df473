//! Cache capability shared by every backend

use crate::error::{AppError, Dependency};
use async_trait::async_trait;
use std::time::Duration;

/// Result type for cache operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors that can occur during cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Connection failed
    #[error("Cache connection failed: {0}")]
    ConnectionFailed(String),

    /// Backend rejected or failed the command
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),

    /// Timeout error
    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),

    /// Stored value could not be encoded or decoded
    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::dependency(Dependency::Cache, err.to_string())
    }
}

/// Key-value store with optional per-entry time-to-live
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Retrieve a value, `None` on miss or expiry
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store a value. `ttl = None` keeps it until evicted or deleted.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()>;

    /// Remove a value. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;
}
