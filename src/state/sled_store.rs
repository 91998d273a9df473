use crate::error::{AppError, Dependency, Result};
use crate::models::{Incident, IncidentLog};
use crate::state::store::not_found;
use crate::state::IncidentRepository;
use async_trait::async_trait;
use chrono::Utc;
use sled::transaction::{ConflictableTransactionError, TransactionError, Transactional};
use sled::Db;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Persistent incident repository using Sled embedded database
///
/// Incident rows live in the `incidents` tree keyed by id. Log entries live in
/// `incident_logs` keyed by `incident_id ++ sequence`, so a prefix scan yields
/// them in insertion order and a delete can sweep them by prefix.
#[derive(Clone)]
pub struct SledRepository {
    db: Arc<Db>,
    incidents_tree: sled::Tree,
    logs_tree: sled::Tree,
}

fn storage_error(context: &str, err: sled::Error) -> AppError {
    AppError::dependency(Dependency::Repository, format!("{}: {}", context, err))
}

impl SledRepository {
    /// Open (or create) a repository at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let db = sled::open(path_ref)
            .map_err(|e| storage_error("Failed to open Sled database", e))?;

        let incidents_tree = db
            .open_tree("incidents")
            .map_err(|e| storage_error("Failed to open incidents tree", e))?;

        let logs_tree = db
            .open_tree("incident_logs")
            .map_err(|e| storage_error("Failed to open incident_logs tree", e))?;

        tracing::info!("Initialized Sled repository at {:?}", path_ref);

        Ok(Self {
            db: Arc::new(db),
            incidents_tree,
            logs_tree,
        })
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value)
            .map_err(|e| AppError::Serialization(format!("Failed to encode record: {}", e)))
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes)
            .map_err(|e| AppError::Serialization(format!("Failed to decode record: {}", e)))
    }

    fn incident_key(id: &Uuid) -> Vec<u8> {
        id.as_bytes().to_vec()
    }

    fn log_key(incident_id: &Uuid, sequence: u64) -> Vec<u8> {
        let mut key = Vec::with_capacity(24);
        key.extend_from_slice(incident_id.as_bytes());
        key.extend_from_slice(&sequence.to_be_bytes());
        key
    }

    fn load_row(&self, id: &Uuid) -> Result<Option<Incident>> {
        match self.incidents_tree.get(Self::incident_key(id)) {
            Ok(Some(bytes)) => Ok(Some(Self::deserialize(&bytes)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(storage_error("Failed to get incident", e)),
        }
    }

    fn load_logs(&self, incident_id: &Uuid) -> Result<Vec<IncidentLog>> {
        let mut logs = Vec::new();
        for entry in self.logs_tree.scan_prefix(incident_id.as_bytes()) {
            let (_, value) = entry.map_err(|e| storage_error("Failed to scan incident logs", e))?;
            logs.push(Self::deserialize(&value)?);
        }
        Ok(logs)
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| storage_error("Failed to flush database", e))?;
        Ok(())
    }
}

#[async_trait]
impl IncidentRepository for SledRepository {
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Incident>> {
        match self.load_row(id)? {
            Some(mut incident) => {
                incident.logs = self.load_logs(id)?;
                Ok(Some(incident))
            }
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<Incident>> {
        let mut incidents: Vec<Incident> = Vec::new();

        for result in self.incidents_tree.iter() {
            let (_, value) = result.map_err(|e| storage_error("Failed to iterate incidents", e))?;
            let mut incident: Incident = Self::deserialize(&value)?;
            incident.logs = self.load_logs(&incident.id)?;
            incidents.push(incident);
        }

        incidents.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(incidents)
    }

    async fn insert(&self, incident: &Incident) -> Result<Incident> {
        let now = Utc::now();
        let mut row = incident.without_logs();
        row.created_at = now;
        row.updated_at = now;

        let swapped = self
            .incidents_tree
            .compare_and_swap(
                Self::incident_key(&row.id),
                None as Option<&[u8]>,
                Some(Self::serialize(&row)?),
            )
            .map_err(|e| storage_error("Failed to insert incident", e))?;

        if swapped.is_err() {
            return Err(AppError::Internal(format!(
                "Incident {} already exists",
                row.id
            )));
        }

        // Flush to ensure durability
        self.incidents_tree
            .flush()
            .map_err(|e| storage_error("Failed to flush incidents tree", e))?;

        tracing::debug!(incident_id = %row.id, status = %row.status, "Incident inserted into Sled");
        Ok(row)
    }

    async fn update(&self, incident: &Incident) -> Result<Incident> {
        let key = Self::incident_key(&incident.id);

        // Swap only over the row we read, so a concurrent delete is never undone
        let mut row = loop {
            let current = self
                .incidents_tree
                .get(&key)
                .map_err(|e| storage_error("Failed to get incident", e))?
                .ok_or_else(|| not_found(&incident.id))?;
            let existing: Incident = Self::deserialize(&current)?;

            let row = Incident {
                created_at: existing.created_at,
                updated_at: Utc::now(),
                ..incident.without_logs()
            };

            let swapped = self
                .incidents_tree
                .compare_and_swap(&key, Some(current), Some(Self::serialize(&row)?))
                .map_err(|e| storage_error("Failed to update incident", e))?;

            if swapped.is_ok() {
                break row;
            }
        };

        self.incidents_tree
            .flush()
            .map_err(|e| storage_error("Failed to flush incidents tree", e))?;

        tracing::debug!(incident_id = %row.id, status = %row.status, "Incident updated in Sled");

        row.logs = self.load_logs(&row.id)?;
        Ok(row)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let removed = self
            .incidents_tree
            .remove(Self::incident_key(id))
            .map_err(|e| storage_error("Failed to delete incident", e))?;

        if removed.is_none() {
            return Err(not_found(id));
        }

        let mut batch = sled::Batch::default();
        for entry in self.logs_tree.scan_prefix(id.as_bytes()) {
            let (key, _) = entry.map_err(|e| storage_error("Failed to scan incident logs", e))?;
            batch.remove(key);
        }
        self.logs_tree
            .apply_batch(batch)
            .map_err(|e| storage_error("Failed to delete incident logs", e))?;

        self.db
            .flush()
            .map_err(|e| storage_error("Failed to flush database", e))?;

        tracing::debug!(incident_id = %id, "Incident deleted from Sled");
        Ok(())
    }

    async fn save_log(&self, log: &IncidentLog) -> Result<IncidentLog> {
        let mut stored = log.clone();
        stored.created_at = Utc::now();

        let sequence = self
            .db
            .generate_id()
            .map_err(|e| storage_error("Failed to allocate log sequence", e))?;

        let incident_key = Self::incident_key(&log.incident_id);
        let log_key = Self::log_key(&log.incident_id, sequence);
        let value = Self::serialize(&stored)?;

        // Existence check and append commit together against a concurrent delete
        (&self.incidents_tree, &self.logs_tree)
            .transaction(|(incidents, logs)| {
                if incidents.get(incident_key.as_slice())?.is_none() {
                    return Err(ConflictableTransactionError::Abort(()));
                }
                logs.insert(log_key.as_slice(), value.as_slice())?;
                Ok(())
            })
            .map_err(|e| match e {
                TransactionError::Abort(()) => not_found(&log.incident_id),
                TransactionError::Storage(e) => storage_error("Failed to save incident log", e),
            })?;

        self.logs_tree
            .flush()
            .map_err(|e| storage_error("Failed to flush incident_logs tree", e))?;

        tracing::debug!(incident_id = %stored.incident_id, log_id = %stored.id, "Incident log saved to Sled");
        Ok(stored)
    }
}
