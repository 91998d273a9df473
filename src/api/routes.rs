use crate::api::{handlers, AppState};
use crate::metrics::track_http_metrics;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health and observability
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route("/auth-check", get(handlers::auth_check))
        // Incident lifecycle
        .route(
            "/v1/incidents",
            post(handlers::create_incident).get(handlers::list_incidents),
        )
        .route(
            "/v1/incidents/:id",
            get(handlers::get_incident)
                .patch(handlers::update_incident)
                .delete(handlers::delete_incident),
        )
        .route("/v1/incidents/:id/logs", post(handlers::add_incident_log))
        // Per-route metrics need the matched path
        .route_layer(middleware::from_fn(track_http_metrics))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_response(DefaultOnResponse::new().include_headers(false)),
        )
        .layer(CorsLayer::permissive())
}
