use crate::auth::Identity;
use crate::cache::{CacheError, CacheResult, IncidentCache};
use crate::config::LifecycleConfig;
use crate::error::{AppError, Dependency, Result};
use crate::lifecycle::metrics::{measure_operation, LIFECYCLE_METRICS};
use crate::messaging::{EventDispatcher, LifecycleEvent, MessagingError, MESSAGING_METRICS};
use crate::models::{Incident, IncidentLog, IncidentPatch, NewIncident};
use crate::state::IncidentRepository;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use uuid::Uuid;
use validator::Validate;

/// Coordinates the repository, the incident cache and the event dispatcher.
///
/// The engine holds no lock of its own. Two concurrent `update` calls on the
/// same incident both read the persisted status, both validate against it and
/// both write; the later write wins. Serializing them is left to the
/// repository.
pub struct IncidentLifecycleEngine {
    repository: Arc<dyn IncidentRepository>,
    cache: IncidentCache,
    dispatcher: Arc<dyn EventDispatcher>,
    source: String,
    timeouts: LifecycleConfig,
}

impl IncidentLifecycleEngine {
    pub fn new(
        repository: Arc<dyn IncidentRepository>,
        cache: IncidentCache,
        dispatcher: Arc<dyn EventDispatcher>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            cache,
            dispatcher,
            source: source.into(),
            timeouts: LifecycleConfig::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: LifecycleConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn cache(&self) -> &IncidentCache {
        &self.cache
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Persist a new `OPEN` incident and emit `IncidentCreated`
    pub async fn create(&self, payload: NewIncident, identity: &Identity) -> Result<Incident> {
        measure_operation("create", async {
            payload.validate()?;
            if payload.title.trim().is_empty() {
                return Err(AppError::InvalidArgument(
                    "title must not be blank".to_string(),
                ));
            }

            let draft = Incident::open(payload.title, payload.description);
            let incident = self.repo("insert", self.repository.insert(&draft)).await?;

            tracing::info!(
                incident_id = %incident.id,
                user_id = %identity.user_id,
                role = %identity.role,
                "Incident created"
            );

            self.emit(LifecycleEvent::incident_created(&self.source, &incident))
                .await;

            Ok(incident)
        })
        .await
    }

    /// Cache-aside read of one incident
    pub async fn get(&self, id: &Uuid) -> Result<Incident> {
        measure_operation("get", async {
            if let Some(incident) = self.read_cached(id).await {
                tracing::info!(incident_id = %id, "Incident fetched from cache");
                return Ok(incident);
            }

            let incident = self.load(id).await?;
            self.populate(&incident).await;

            Ok(incident)
        })
        .await
    }

    /// Apply a status transition validated against the persisted status
    pub async fn update(&self, id: &Uuid, patch: IncidentPatch) -> Result<Incident> {
        measure_operation("update", async {
            let mut incident = self.load(id).await?;

            let next = patch.status.ok_or_else(|| {
                AppError::InvalidArgument("No fields provided for update".to_string())
            })?;

            let previous = incident
                .transition_to(next)
                .map_err(|(from, to)| AppError::InvalidTransition { from, to })?;

            let saved = self.repo("update", self.repository.update(&incident)).await?;
            self.invalidate(id).await;

            LIFECYCLE_METRICS
                .status_transitions
                .with_label_values(&[&previous.to_string(), &next.to_string()])
                .inc();

            tracing::info!(
                incident_id = %id,
                from = %previous,
                to = %next,
                "Incident status updated"
            );

            Ok(saved)
        })
        .await
    }

    /// Attach a log entry and emit `IncidentLogAttached`
    pub async fn add_log(&self, id: &Uuid, message: String) -> Result<IncidentLog> {
        measure_operation("add_log", async {
            if message.trim().is_empty() {
                return Err(AppError::InvalidArgument(
                    "message must not be blank".to_string(),
                ));
            }

            self.load(id).await?;

            let draft = IncidentLog::new(*id, message);
            let log = self
                .repo("save_log", self.repository.save_log(&draft))
                .await?;
            self.invalidate(id).await;

            tracing::info!(incident_id = %id, log_id = %log.id, "Incident log attached");

            self.emit(LifecycleEvent::log_attached(&self.source, &log))
                .await;

            Ok(log)
        })
        .await
    }

    /// Delete an incident and its logs. No lifecycle event is emitted.
    pub async fn delete(&self, id: &Uuid) -> Result<()> {
        measure_operation("delete", async {
            self.load(id).await?;
            self.repo("delete", self.repository.delete(id)).await?;
            self.invalidate(id).await;

            tracing::info!(incident_id = %id, "Incident deleted");
            Ok(())
        })
        .await
    }

    /// Every incident, straight from the repository
    pub async fn list(&self) -> Result<Vec<Incident>> {
        measure_operation("list", async {
            self.repo("list_all", self.repository.list_all()).await
        })
        .await
    }

    /// Authoritative load, bypassing the cache
    async fn load(&self, id: &Uuid) -> Result<Incident> {
        self.repo("get_by_id", self.repository.get_by_id(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Incident {} not found", id)))
    }

    /// Bound a repository call; a timeout aborts the operation
    async fn repo<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let limit = self.timeouts.repository_timeout();
        match timeout(limit, f).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                if !e.is_domain_error() {
                    tracing::error!(operation, error = ?e, "Repository call failed");
                }
                Err(e)
            }
            Err(_) => {
                tracing::error!(operation, timeout_ms = limit.as_millis() as u64, "Repository call timed out");
                Err(AppError::dependency(
                    Dependency::Repository,
                    format!("{} timed out after {:?}", operation, limit),
                ))
            }
        }
    }

    /// Bound a cache call; elapsing the limit surfaces as `CacheError::Timeout`
    async fn bounded_cache<T, F>(&self, f: F) -> CacheResult<T>
    where
        F: Future<Output = CacheResult<T>>,
    {
        let limit = self.timeouts.cache_timeout();
        timeout(limit, f)
            .await
            .unwrap_or_else(|_| Err(CacheError::Timeout(limit)))
    }

    /// Cache lookup that degrades to a miss on any failure
    async fn read_cached(&self, id: &Uuid) -> Option<Incident> {
        let (incident, label) = match self.bounded_cache(self.cache.get(id)).await {
            Ok(Some(incident)) => (Some(incident), "hit"),
            Ok(None) => (None, "miss"),
            Err(e) => {
                tracing::warn!(incident_id = %id, error = %e, "Cache read failed, falling back to repository");
                (None, "error")
            }
        };

        LIFECYCLE_METRICS
            .cache_lookups
            .with_label_values(&[label])
            .inc();

        incident
    }

    async fn populate(&self, incident: &Incident) {
        if let Err(error) = self.bounded_cache(self.cache.put(incident)).await {
            LIFECYCLE_METRICS
                .cache_failures
                .with_label_values(&["set"])
                .inc();
            tracing::warn!(incident_id = %incident.id, error = %error, "Failed to populate incident cache");
        }
    }

    /// Drop the cached snapshot. Failure leaves staleness bounded by the TTL.
    async fn invalidate(&self, id: &Uuid) {
        if let Err(error) = self.bounded_cache(self.cache.invalidate(id)).await {
            LIFECYCLE_METRICS
                .cache_failures
                .with_label_values(&["delete"])
                .inc();
            tracing::warn!(
                incident_id = %id,
                key = %self.cache.key_for(id),
                error = %error,
                "Failed to invalidate incident cache"
            );
        }
    }

    /// Hand an event to the dispatcher; failures are logged and dropped
    async fn emit(&self, event: LifecycleEvent) {
        let backend = self.dispatcher.backend_name();
        let event_type = event.event_type();
        let start = Instant::now();

        let limit = self.timeouts.event_timeout();
        let result = timeout(limit, self.dispatcher.emit(&event))
            .await
            .unwrap_or_else(|_| Err(MessagingError::Timeout(format!("emit exceeded {:?}", limit))));

        MESSAGING_METRICS
            .publish_latency
            .with_label_values(&[backend])
            .observe(start.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                MESSAGING_METRICS
                    .events_published
                    .with_label_values(&[event_type, backend])
                    .inc();
            }
            Err(error) => {
                let kind = match &error {
                    MessagingError::Timeout(_) => "timeout",
                    _ => "publish",
                };
                MESSAGING_METRICS
                    .publish_failures
                    .with_label_values(&[event_type, backend, kind])
                    .inc();
                tracing::warn!(
                    event_type,
                    event_id = %event.event_id,
                    incident_id = %event.incident_id(),
                    backend,
                    error = %error,
                    "Dropping lifecycle event"
                );
            }
        }
    }
}
