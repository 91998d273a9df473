use crate::cache::{CacheBackend, CacheResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Prefixes every key with `<prefix>:` before delegating to the inner backend
#[derive(Clone)]
pub struct NamespacedCache {
    prefix: String,
    backend: Arc<dyn CacheBackend>,
}

impl NamespacedCache {
    pub fn new(prefix: impl Into<String>, backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            prefix: prefix.into(),
            backend,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn namespaced_key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

#[async_trait]
impl CacheBackend for NamespacedCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.backend.get(&self.namespaced_key(key)).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()> {
        self.backend.set(&self.namespaced_key(key), value, ttl).await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.backend.delete(&self.namespaced_key(key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheBackend;

    #[tokio::test]
    async fn test_keys_are_prefixed() {
        let physical = Arc::new(MemoryCacheBackend::new(100));
        let cache = NamespacedCache::new("incident", physical.clone());

        cache.set("42", b"value".to_vec(), None).await.unwrap();

        assert_eq!(cache.namespaced_key("42"), "incident:42");
        assert_eq!(physical.get("incident:42").await.unwrap(), Some(b"value".to_vec()));
        assert_eq!(physical.get("42").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_namespaces_do_not_collide() {
        let physical: Arc<dyn CacheBackend> = Arc::new(MemoryCacheBackend::new(100));
        let incidents = NamespacedCache::new("incident", physical.clone());
        let users = NamespacedCache::new("user", physical.clone());

        incidents.set("1", b"incident".to_vec(), None).await.unwrap();
        users.set("1", b"user".to_vec(), None).await.unwrap();

        assert_eq!(incidents.get("1").await.unwrap(), Some(b"incident".to_vec()));
        assert_eq!(users.get("1").await.unwrap(), Some(b"user".to_vec()));

        users.delete("1").await.unwrap();
        assert!(incidents.get("1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_nested_namespaces() {
        let physical = Arc::new(MemoryCacheBackend::new(100));
        let service = Arc::new(NamespacedCache::new("incident_service", physical.clone()));
        let incidents = NamespacedCache::new("incident", service);

        incidents.set("7", b"v".to_vec(), None).await.unwrap();
        assert!(physical.get("incident_service:incident:7").await.unwrap().is_some());
    }
}
