use incident_lifecycle::{
    api::{build_router, AppState},
    auth::StaticTokenGuard,
    cache::{create_cache_backend, IncidentCache},
    config::{Config, ObservabilityConfig},
    lifecycle::IncidentLifecycleEngine,
    messaging::create_dispatcher,
    metrics,
    state::create_repository,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    init_tracing(&config.observability);

    tracing::info!(
        service = %config.observability.service_name,
        "Starting incident lifecycle service v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        metrics::init_metrics();
    } else {
        tracing::info!("Prometheus metrics disabled in configuration");
    }

    // Collaborators are built once and shared by every request
    tracing::info!(backend = ?config.state.backend, "Initializing repository");
    let repository = create_repository(&config.state)?;

    tracing::info!(backend = ?config.cache.backend, "Initializing cache");
    let backend = create_cache_backend(&config.cache).await?;
    let cache = IncidentCache::new(backend, &config.cache.namespace, config.cache.ttl());

    tracing::info!(backend = ?config.messaging.backend, topic = %config.messaging.topic, "Initializing event dispatcher");
    let dispatcher = create_dispatcher(&config.messaging)?;

    let engine = Arc::new(
        IncidentLifecycleEngine::new(repository, cache, dispatcher, &config.messaging.source)
            .with_timeouts(config.lifecycle.clone()),
    );

    let guard = StaticTokenGuard::from_entries(&config.auth.tokens);
    if guard.is_empty() {
        tracing::warn!("No API tokens configured; every authenticated route will answer 401");
    } else {
        tracing::info!(tokens = guard.len(), "Loaded API tokens");
    }

    let app = build_router(AppState::new(engine, Arc::new(guard))).layer(TimeoutLayer::new(
        Duration::from_secs(config.server.request_timeout_secs),
    ));

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   REST API: http://{}/v1/incidents", http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Shutting down gracefully...");
    Ok(())
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "incident_lifecycle={},tower_http=info",
            observability.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
