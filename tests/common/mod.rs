//! Shared fixtures for the integration suites
//!
//! Collaborator doubles that fail, stall, or record the order in which the
//! engine touches them.

#![allow(dead_code)]

use async_trait::async_trait;
use incident_lifecycle::{
    cache::{CacheBackend, CacheError, CacheResult, IncidentCache, MemoryCacheBackend, DEFAULT_TTL},
    config::LifecycleConfig,
    error::{AppError, Dependency, Result},
    lifecycle::IncidentLifecycleEngine,
    messaging::{EventDispatcher, InMemoryDispatcher, LifecycleEvent, MessagingError, MessagingResult},
    models::{Incident, IncidentLog},
    state::{IncidentRepository, InMemoryRepository},
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;
use uuid::Uuid;

pub const SOURCE: &str = "incident_service";

/// Ordered record of collaborator calls shared across doubles
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// In-memory repository whose writes can be switched off
#[derive(Clone, Default)]
pub struct FlakyRepository {
    inner: InMemoryRepository,
    writes_down: Arc<AtomicBool>,
    reads_down: Arc<AtomicBool>,
    journal: Journal,
}

impl FlakyRepository {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Default::default()
        }
    }

    pub fn fail_writes(&self, down: bool) {
        self.writes_down.store(down, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, down: bool) {
        self.reads_down.store(down, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<()> {
        if self.reads_down.load(Ordering::SeqCst) {
            return Err(AppError::dependency(Dependency::Repository, "connection refused"));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<()> {
        if self.writes_down.load(Ordering::SeqCst) {
            return Err(AppError::dependency(Dependency::Repository, "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl IncidentRepository for FlakyRepository {
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Incident>> {
        self.check_reads()?;
        self.inner.get_by_id(id).await
    }

    async fn list_all(&self) -> Result<Vec<Incident>> {
        self.check_reads()?;
        self.inner.list_all().await
    }

    async fn insert(&self, incident: &Incident) -> Result<Incident> {
        self.check_writes()?;
        let saved = self.inner.insert(incident).await?;
        self.journal.record("repository.insert");
        Ok(saved)
    }

    async fn update(&self, incident: &Incident) -> Result<Incident> {
        self.check_writes()?;
        let saved = self.inner.update(incident).await?;
        self.journal.record("repository.update");
        Ok(saved)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        self.check_writes()?;
        self.inner.delete(id).await?;
        self.journal.record("repository.delete");
        Ok(())
    }

    async fn save_log(&self, log: &IncidentLog) -> Result<IncidentLog> {
        self.check_writes()?;
        let saved = self.inner.save_log(log).await?;
        self.journal.record("repository.save_log");
        Ok(saved)
    }
}

/// Repository that never answers
pub struct StalledRepository;

#[async_trait]
impl IncidentRepository for StalledRepository {
    async fn get_by_id(&self, _id: &Uuid) -> Result<Option<Incident>> {
        std::future::pending().await
    }

    async fn list_all(&self) -> Result<Vec<Incident>> {
        std::future::pending().await
    }

    async fn insert(&self, _incident: &Incident) -> Result<Incident> {
        std::future::pending().await
    }

    async fn update(&self, _incident: &Incident) -> Result<Incident> {
        std::future::pending().await
    }

    async fn delete(&self, _id: &Uuid) -> Result<()> {
        std::future::pending().await
    }

    async fn save_log(&self, _log: &IncidentLog) -> Result<IncidentLog> {
        std::future::pending().await
    }
}

/// Repository that holds every `get_by_id` at a barrier, so concurrent
/// mutations all read before any of them writes
pub struct GatedRepository {
    inner: InMemoryRepository,
    gate: Arc<Barrier>,
    armed: AtomicBool,
}

impl GatedRepository {
    pub fn new(inner: InMemoryRepository, parties: usize) -> Self {
        Self {
            inner,
            gate: Arc::new(Barrier::new(parties)),
            armed: AtomicBool::new(false),
        }
    }

    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl IncidentRepository for GatedRepository {
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Incident>> {
        let loaded = self.inner.get_by_id(id).await;
        if self.armed.load(Ordering::SeqCst) {
            self.gate.wait().await;
        }
        loaded
    }

    async fn list_all(&self) -> Result<Vec<Incident>> {
        self.inner.list_all().await
    }

    async fn insert(&self, incident: &Incident) -> Result<Incident> {
        self.inner.insert(incident).await
    }

    async fn update(&self, incident: &Incident) -> Result<Incident> {
        self.inner.update(incident).await
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        self.inner.delete(id).await
    }

    async fn save_log(&self, log: &IncidentLog) -> Result<IncidentLog> {
        self.inner.save_log(log).await
    }
}

/// Cache backend that journals calls and can be taken offline
#[derive(Clone)]
pub struct FlakyCache {
    inner: Arc<MemoryCacheBackend>,
    down: Arc<AtomicBool>,
    journal: Journal,
}

impl FlakyCache {
    pub fn new(journal: Journal) -> Self {
        Self {
            inner: Arc::new(MemoryCacheBackend::new(1_000)),
            down: Arc::new(AtomicBool::new(false)),
            journal,
        }
    }

    pub fn fail(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> CacheResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(CacheError::ConnectionFailed("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for FlakyCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()> {
        self.check()?;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.journal.record("cache.delete");
        self.check()?;
        self.inner.delete(key).await
    }
}

/// Cache backend that never answers
pub struct StalledCache;

#[async_trait]
impl CacheBackend for StalledCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Option<Duration>) -> CacheResult<()> {
        std::future::pending().await
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        std::future::pending().await
    }
}

/// Dispatcher that journals and records events, optionally rejecting them
#[derive(Clone, Default)]
pub struct FlakyDispatcher {
    recorded: InMemoryDispatcher,
    down: Arc<AtomicBool>,
    journal: Journal,
}

impl FlakyDispatcher {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Default::default()
        }
    }

    pub fn fail(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn events(&self) -> InMemoryDispatcher {
        self.recorded.clone()
    }
}

#[async_trait]
impl EventDispatcher for FlakyDispatcher {
    async fn emit(&self, event: &LifecycleEvent) -> MessagingResult<()> {
        self.journal.record(format!("emit.{}", event.event_type()));
        if self.down.load(Ordering::SeqCst) {
            return Err(MessagingError::BackendUnavailable("broker down".to_string()));
        }
        self.recorded.emit(event).await
    }

    fn backend_name(&self) -> &'static str {
        "flaky"
    }
}

/// Dispatcher that never answers
pub struct StalledDispatcher;

#[async_trait]
impl EventDispatcher for StalledDispatcher {
    async fn emit(&self, _event: &LifecycleEvent) -> MessagingResult<()> {
        std::future::pending().await
    }

    fn backend_name(&self) -> &'static str {
        "stalled"
    }
}

/// Engine over flaky doubles with handles to each of them
pub struct Harness {
    pub engine: IncidentLifecycleEngine,
    pub repository: FlakyRepository,
    pub cache: FlakyCache,
    pub dispatcher: FlakyDispatcher,
    pub journal: Journal,
}

impl Harness {
    pub fn new() -> Self {
        let journal = Journal::default();
        let repository = FlakyRepository::new(journal.clone());
        let cache = FlakyCache::new(journal.clone());
        let dispatcher = FlakyDispatcher::new(journal.clone());

        let engine = IncidentLifecycleEngine::new(
            Arc::new(repository.clone()),
            IncidentCache::new(Arc::new(cache.clone()), "incident", DEFAULT_TTL),
            Arc::new(dispatcher.clone()),
            SOURCE,
        )
        .with_timeouts(short_timeouts());

        Self {
            engine,
            repository,
            cache,
            dispatcher,
            journal,
        }
    }

    pub fn events(&self) -> InMemoryDispatcher {
        self.dispatcher.events()
    }
}

pub fn short_timeouts() -> LifecycleConfig {
    LifecycleConfig {
        repository_timeout_ms: 200,
        cache_timeout_ms: 50,
        event_timeout_ms: 50,
    }
}

/// Engine over plain in-memory collaborators
pub fn memory_engine() -> (IncidentLifecycleEngine, InMemoryDispatcher) {
    let dispatcher = InMemoryDispatcher::new();
    let engine = IncidentLifecycleEngine::new(
        Arc::new(InMemoryRepository::new()),
        IncidentCache::new(Arc::new(MemoryCacheBackend::new(1_000)), "incident", DEFAULT_TTL),
        Arc::new(dispatcher.clone()),
        SOURCE,
    );
    (engine, dispatcher)
}
