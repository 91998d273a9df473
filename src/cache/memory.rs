use crate::cache::{CacheBackend, CacheResult};
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CachedValue {
    bytes: Vec<u8>,
    ttl: Option<Duration>,
}

/// Expires each entry after its own TTL; a re-`set` restarts the clock
struct PerEntryExpiry;

impl Expiry<String, CachedValue> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// In-process cache backend using Moka
#[derive(Clone)]
pub struct MemoryCacheBackend {
    cache: Cache<String, CachedValue>,
}

impl MemoryCacheBackend {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(self.cache.get(key).await.map(|value| value.bytes))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()> {
        self.cache
            .insert(key.to_string(), CachedValue { bytes: value, ttl })
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_basic_operations() {
        let cache = MemoryCacheBackend::new(100);

        cache.set("key1", b"value1".to_vec(), None).await.unwrap();

        let value = cache.get("key1").await.unwrap();
        assert_eq!(value, Some(b"value1".to_vec()));

        cache.delete("key1").await.unwrap();
        let value = cache.get("key1").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_delete_missing_key() {
        let cache = MemoryCacheBackend::new(100);
        assert!(cache.delete("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_cache_ttl() {
        let cache = MemoryCacheBackend::new(100);

        cache
            .set("short", b"value".to_vec(), Some(Duration::from_millis(100)))
            .await
            .unwrap();
        cache.set("forever", b"value".to_vec(), None).await.unwrap();

        // Value should be present immediately
        assert!(cache.get("short").await.unwrap().is_some());

        // Wait for TTL to expire
        tokio::time::sleep(Duration::from_millis(150)).await;

        // Value should be expired
        assert!(cache.get("short").await.unwrap().is_none());
        assert!(cache.get("forever").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_ttl() {
        let cache = MemoryCacheBackend::new(100);

        cache
            .set("key", b"old".to_vec(), Some(Duration::from_millis(100)))
            .await
            .unwrap();
        cache.set("key", b"new".to_vec(), None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(cache.get("key").await.unwrap(), Some(b"new".to_vec()));
    }
}
