use crate::cache::{CacheBackend, CacheError, CacheResult, MemoryCacheBackend, NamespacedCache, RedisCacheBackend};
use crate::config::{CacheBackendKind, CacheConfig};
use std::sync::Arc;

/// Create the process-wide physical cache backend from configuration.
///
/// When `key_prefix` is set the backend is wrapped in a [`NamespacedCache`]
/// so this service's keys cannot collide with other tenants of a shared
/// Redis.
pub async fn create_cache_backend(config: &CacheConfig) -> CacheResult<Arc<dyn CacheBackend>> {
    let backend: Arc<dyn CacheBackend> = match config.backend {
        CacheBackendKind::Memory => {
            tracing::info!(max_capacity = config.max_capacity, "Initializing in-memory cache backend");
            Arc::new(MemoryCacheBackend::new(config.max_capacity))
        }

        CacheBackendKind::Redis => {
            let redis_url = config.redis_url.as_ref().ok_or_else(|| {
                CacheError::ConnectionFailed(
                    "Redis cache backend requires 'redis_url' configuration".to_string(),
                )
            })?;

            tracing::info!(url = %redis_url, "Initializing Redis cache backend");
            Arc::new(RedisCacheBackend::new(redis_url).await?)
        }
    };

    Ok(match config.key_prefix.as_deref() {
        Some(prefix) if !prefix.is_empty() => Arc::new(NamespacedCache::new(prefix, backend)),
        _ => backend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_memory_backend() {
        let backend = create_cache_backend(&CacheConfig::default()).await.unwrap();
        backend.set("k", b"v".to_vec(), None).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_redis_requires_url() {
        let config = CacheConfig {
            backend: CacheBackendKind::Redis,
            redis_url: None,
            ..Default::default()
        };

        assert!(create_cache_backend(&config).await.is_err());
    }
}
