use crate::cache::{CacheBackend, CacheResult, NamespacedCache};
use crate::models::Incident;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Snapshot lifetime used when none is configured
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Typed view over the cache: JSON snapshots of incidents keyed by id
#[derive(Clone)]
pub struct IncidentCache {
    cache: NamespacedCache,
    ttl: Duration,
}

impl IncidentCache {
    pub fn new(backend: Arc<dyn CacheBackend>, namespace: &str, ttl: Duration) -> Self {
        Self {
            cache: NamespacedCache::new(namespace, backend),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Key as seen by the backend below this cache, e.g. `incident:<id>`
    pub fn key_for(&self, id: &Uuid) -> String {
        self.cache.namespaced_key(&id.to_string())
    }

    /// Raw snapshot bytes, used to check cache hits are served verbatim
    pub async fn get_raw(&self, id: &Uuid) -> CacheResult<Option<Vec<u8>>> {
        self.cache.get(&id.to_string()).await
    }

    /// Fetch and decode a snapshot. A snapshot that no longer decodes is an error.
    pub async fn get(&self, id: &Uuid) -> CacheResult<Option<Incident>> {
        match self.get_raw(id).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub async fn put(&self, incident: &Incident) -> CacheResult<()> {
        let bytes = serde_json::to_vec(incident)?;
        self.cache
            .set(&incident.id.to_string(), bytes, Some(self.ttl))
            .await
    }

    pub async fn invalidate(&self, id: &Uuid) -> CacheResult<()> {
        self.cache.delete(&id.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, MemoryCacheBackend};
    use crate::models::IncidentLog;

    fn cache_with_backend() -> (IncidentCache, Arc<MemoryCacheBackend>) {
        let backend = Arc::new(MemoryCacheBackend::new(100));
        (IncidentCache::new(backend.clone(), "incident", DEFAULT_TTL), backend)
    }

    #[tokio::test]
    async fn test_put_get_invalidate() {
        let (cache, _) = cache_with_backend();
        let mut incident = Incident::open("DB outage".to_string(), "replica down".to_string());
        incident.logs.push(IncidentLog::new(incident.id, "paged".to_string()));

        assert!(cache.get(&incident.id).await.unwrap().is_none());

        cache.put(&incident).await.unwrap();
        assert_eq!(cache.get(&incident.id).await.unwrap(), Some(incident.clone()));

        cache.invalidate(&incident.id).await.unwrap();
        assert!(cache.get(&incident.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_key_layout() {
        let (cache, backend) = cache_with_backend();
        let incident = Incident::open("t".to_string(), String::new());
        cache.put(&incident).await.unwrap();

        let key = format!("incident:{}", incident.id);
        assert_eq!(cache.key_for(&incident.id), key);
        assert!(backend.get(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_error() {
        let (cache, backend) = cache_with_backend();
        let id = Uuid::new_v4();
        backend
            .set(&format!("incident:{}", id), b"{not json".to_vec(), None)
            .await
            .unwrap();

        assert!(matches!(
            cache.get(&id).await,
            Err(CacheError::Serialization(_))
        ));
    }
}
