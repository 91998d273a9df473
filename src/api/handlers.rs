use crate::api::AppState;
use crate::auth::{Identity, Role};
use crate::error::{AppError, Result};
use crate::models::{Incident, IncidentLog, IncidentPatch, NewIncident, NewIncidentLog};
use axum::{
    extract::{FromRequest, FromRequestParts, Path, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

/// Roles allowed to mutate incidents
const WRITERS: &[Role] = &[Role::Admin, Role::Engineer];

/// Roles allowed to delete incidents
const ADMINS: &[Role] = &[Role::Admin];

/// Identity resolved from an `Authorization: Bearer <token>` header
pub struct Authenticated(pub Identity);

#[axum::async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing credentials".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("Expected a bearer token".to_string()))?;

        state.guard.authenticate(token).map(Authenticated)
    }
}

impl Authenticated {
    fn require(self, state: &AppState, allowed: &[Role]) -> Result<Identity> {
        state.guard.authorize(&self.0, allowed)
    }
}

/// JSON request body whose rejections render as `INVALID_ARGUMENT`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidArgument(format!("Invalid incident id: {}", raw)))
}

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    (StatusCode::OK, crate::metrics::gather_metrics())
}

/// Echo the identity behind the presented credential
pub async fn auth_check(Authenticated(identity): Authenticated) -> Json<AuthCheckResponse> {
    Json(AuthCheckResponse {
        status: "ok".to_string(),
        identity,
    })
}

#[derive(Debug, Serialize)]
pub struct AuthCheckResponse {
    pub status: String,
    pub identity: Identity,
}

/// Create an incident
pub async fn create_incident(
    State(state): State<AppState>,
    caller: Authenticated,
    ApiJson(request): ApiJson<NewIncident>,
) -> Result<(StatusCode, Json<Incident>)> {
    let identity = caller.require(&state, WRITERS)?;
    let incident = state.engine.create(request, &identity).await?;
    Ok((StatusCode::CREATED, Json(incident)))
}

/// List incidents
pub async fn list_incidents(
    State(state): State<AppState>,
    _caller: Authenticated,
) -> Result<Json<ListIncidentsResponse>> {
    let incidents = state.engine.list().await?;
    Ok(Json(ListIncidentsResponse {
        total: incidents.len(),
        incidents,
    }))
}

#[derive(Debug, Serialize)]
pub struct ListIncidentsResponse {
    pub incidents: Vec<Incident>,
    pub total: usize,
}

/// Get an incident by ID
pub async fn get_incident(
    State(state): State<AppState>,
    _caller: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Incident>> {
    let id = parse_id(&id)?;
    Ok(Json(state.engine.get(&id).await?))
}

/// Change incident status
pub async fn update_incident(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<IncidentPatch>,
) -> Result<Json<Incident>> {
    let identity = caller.require(&state, WRITERS)?;
    let id = parse_id(&id)?;

    let incident = state.engine.update(&id, patch).await?;
    tracing::debug!(incident_id = %id, user_id = %identity.user_id, "Status change applied");

    Ok(Json(incident))
}

/// Delete an incident
pub async fn delete_incident(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let identity = caller.require(&state, ADMINS)?;
    let id = parse_id(&id)?;

    state.engine.delete(&id).await?;
    tracing::debug!(incident_id = %id, user_id = %identity.user_id, "Delete applied");

    Ok(StatusCode::NO_CONTENT)
}

/// Attach a log entry to an incident
pub async fn add_incident_log(
    State(state): State<AppState>,
    caller: Authenticated,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<NewIncidentLog>,
) -> Result<(StatusCode, Json<IncidentLog>)> {
    caller.require(&state, WRITERS)?;
    let id = parse_id(&id)?;

    let log = state.engine.add_log(&id, request.message).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_rejects_garbage() {
        assert!(matches!(parse_id("nope"), Err(AppError::InvalidArgument(_))));
        assert!(parse_id(&Uuid::new_v4().to_string()).is_ok());
    }

    #[test]
    fn test_role_tables() {
        assert!(WRITERS.contains(&Role::Engineer));
        assert!(!WRITERS.contains(&Role::Viewer));
        assert_eq!(ADMINS, &[Role::Admin]);
    }
}
