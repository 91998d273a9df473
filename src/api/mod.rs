pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::auth::IdentityGuard;
use crate::lifecycle::IncidentLifecycleEngine;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<IncidentLifecycleEngine>,
    pub guard: Arc<dyn IdentityGuard>,
}

impl AppState {
    pub fn new(engine: Arc<IncidentLifecycleEngine>, guard: Arc<dyn IdentityGuard>) -> Self {
        Self { engine, guard }
    }
}
