use crate::config::{StateBackend, StateConfig};
use crate::error::{AppError, Result};
use crate::state::{IncidentRepository, InMemoryRepository, SledRepository};
use std::sync::Arc;

/// Create an incident repository based on configuration
pub fn create_repository(config: &StateConfig) -> Result<Arc<dyn IncidentRepository>> {
    match config.backend {
        StateBackend::Memory => Ok(create_in_memory_repository()),

        StateBackend::Sled => {
            let path = config.path.as_ref().ok_or_else(|| {
                AppError::Configuration("Sled backend requires 'path' configuration".to_string())
            })?;

            tracing::info!(path = ?path, "Initializing Sled storage backend");

            let repository = SledRepository::new(path)?;
            Ok(Arc::new(repository))
        }
    }
}

/// Create an in-memory repository (for testing and development)
pub fn create_in_memory_repository() -> Arc<dyn IncidentRepository> {
    tracing::info!("Initializing in-memory storage backend");
    Arc::new(InMemoryRepository::new())
}
