//! Prometheus metrics for messaging

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

/// Messaging metrics
pub struct MessagingMetrics {
    /// Events handed to a dispatcher
    pub events_published: CounterVec,

    /// Events the dispatcher rejected or timed out on
    pub publish_failures: CounterVec,

    /// Time spent inside `emit`
    pub publish_latency: HistogramVec,
}

lazy_static! {
    pub static ref MESSAGING_METRICS: MessagingMetrics = MessagingMetrics {
        events_published: register_counter_vec!(
            "lifecycle_events_published_total",
            "Total number of lifecycle events published",
            &["event_type", "backend"]
        )
        .unwrap(),

        publish_failures: register_counter_vec!(
            "lifecycle_event_publish_failures_total",
            "Total number of lifecycle events dropped after a publish failure",
            &["event_type", "backend", "error"]
        )
        .unwrap(),

        publish_latency: register_histogram_vec!(
            "lifecycle_event_publish_latency_seconds",
            "Lifecycle event publish latency in seconds",
            &["backend"]
        )
        .unwrap(),
    };
}

/// Initialize messaging metrics
pub fn init_messaging_metrics() {
    lazy_static::initialize(&MESSAGING_METRICS);
}
