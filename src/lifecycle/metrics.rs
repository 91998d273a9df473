//! Prometheus metrics for the lifecycle engine

use crate::error::AppError;
use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};
use std::future::Future;
use std::time::Instant;

/// Lifecycle engine metrics
pub struct LifecycleMetrics {
    /// Engine calls by operation and outcome (`ok` or an error code)
    pub operations: CounterVec,

    /// Engine call latency
    pub operation_duration: HistogramVec,

    /// Cache lookups by result (`hit`, `miss`, `error`)
    pub cache_lookups: CounterVec,

    /// Cache writes and invalidations that failed and were swallowed
    pub cache_failures: CounterVec,

    /// Accepted status transitions
    pub status_transitions: CounterVec,
}

lazy_static! {
    pub static ref LIFECYCLE_METRICS: LifecycleMetrics = LifecycleMetrics {
        operations: register_counter_vec!(
            "lifecycle_operations_total",
            "Total number of lifecycle engine operations",
            &["operation", "outcome"]
        )
        .unwrap(),

        operation_duration: register_histogram_vec!(
            "lifecycle_operation_duration_seconds",
            "Lifecycle engine operation latency in seconds",
            &["operation"]
        )
        .unwrap(),

        cache_lookups: register_counter_vec!(
            "lifecycle_cache_lookups_total",
            "Total number of incident cache lookups",
            &["result"]
        )
        .unwrap(),

        cache_failures: register_counter_vec!(
            "lifecycle_cache_failures_total",
            "Total number of swallowed incident cache failures",
            &["operation"]
        )
        .unwrap(),

        status_transitions: register_counter_vec!(
            "lifecycle_status_transitions_total",
            "Total number of accepted incident status transitions",
            &["from", "to"]
        )
        .unwrap(),
    };
}

/// Initialize lifecycle metrics
pub fn init_lifecycle_metrics() {
    lazy_static::initialize(&LIFECYCLE_METRICS);
}

/// Time an engine operation and count its outcome
pub async fn measure_operation<F, T>(operation: &str, f: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    let start = Instant::now();
    let result = f.await;

    LIFECYCLE_METRICS
        .operation_duration
        .with_label_values(&[operation])
        .observe(start.elapsed().as_secs_f64());

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.error_code(),
    };
    LIFECYCLE_METRICS
        .operations
        .with_label_values(&[operation, outcome])
        .inc();

    result
}
