use crate::error::{AppError, Result};
use crate::models::{Incident, IncidentLog};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Durable storage for incidents and their log entries.
///
/// Implementations assign `created_at` on insert and `updated_at` on every
/// write. `update` never touches the stored log collection; logs are only
/// appended through `save_log` and removed together with their incident.
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    /// Load an incident with its logs in insertion order
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Incident>>;

    /// Load every incident, oldest first
    async fn list_all(&self) -> Result<Vec<Incident>>;

    /// Persist a new incident; an existing id is rejected
    async fn insert(&self, incident: &Incident) -> Result<Incident>;

    /// Overwrite the row of an existing incident, failing with `NotFound`
    /// when the row is gone
    async fn update(&self, incident: &Incident) -> Result<Incident>;

    /// Delete an incident and, transitively, its logs
    async fn delete(&self, id: &Uuid) -> Result<()>;

    /// Append a log entry to an existing incident
    async fn save_log(&self, log: &IncidentLog) -> Result<IncidentLog>;
}

pub(crate) fn not_found(id: &Uuid) -> AppError {
    AppError::NotFound(format!("Incident {} not found", id))
}

/// Row and logs share one map entry, so each write is atomic per incident
#[derive(Debug, Clone)]
struct Record {
    row: Incident,
    logs: Vec<IncidentLog>,
}

impl Record {
    fn snapshot(&self) -> Incident {
        Incident {
            logs: self.logs.clone(),
            ..self.row.clone()
        }
    }
}

/// In-memory incident repository (for development and testing)
#[derive(Clone)]
pub struct InMemoryRepository {
    records: Arc<DashMap<Uuid, Record>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IncidentRepository for InMemoryRepository {
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Incident>> {
        Ok(self.records.get(id).map(|record| record.snapshot()))
    }

    async fn list_all(&self) -> Result<Vec<Incident>> {
        let mut incidents: Vec<Incident> = self
            .records
            .iter()
            .map(|entry| entry.value().snapshot())
            .collect();

        incidents.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(incidents)
    }

    async fn insert(&self, incident: &Incident) -> Result<Incident> {
        let now = Utc::now();
        let mut row = incident.without_logs();
        row.created_at = now;
        row.updated_at = now;

        match self.records.entry(row.id) {
            Entry::Occupied(_) => Err(AppError::Internal(format!(
                "Incident {} already exists",
                row.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(Record {
                    row: row.clone(),
                    logs: Vec::new(),
                });
                tracing::debug!(incident_id = %row.id, status = %row.status, "Incident inserted");
                Ok(row)
            }
        }
    }

    async fn update(&self, incident: &Incident) -> Result<Incident> {
        let mut record = self
            .records
            .get_mut(&incident.id)
            .ok_or_else(|| not_found(&incident.id))?;

        let created_at = record.row.created_at;
        record.row = Incident {
            created_at,
            updated_at: Utc::now(),
            ..incident.without_logs()
        };

        tracing::debug!(incident_id = %incident.id, status = %record.row.status, "Incident updated");
        Ok(record.snapshot())
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        if self.records.remove(id).is_some() {
            tracing::debug!(incident_id = %id, "Incident deleted");
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    async fn save_log(&self, log: &IncidentLog) -> Result<IncidentLog> {
        let mut record = self
            .records
            .get_mut(&log.incident_id)
            .ok_or_else(|| not_found(&log.incident_id))?;

        let mut stored = log.clone();
        stored.created_at = Utc::now();
        record.logs.push(stored.clone());

        tracing::debug!(incident_id = %log.incident_id, log_id = %stored.id, "Incident log saved");
        Ok(stored)
    }
}
