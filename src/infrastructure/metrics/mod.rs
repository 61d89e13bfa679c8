//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Open WebSocket connections by lifecycle state
//! - Online user count
//! - Messages dispatched, live deliveries and dropped sends
//! - Database query duration histograms

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Open WebSocket connections gauge
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<GaugeVec> = Lazy::new(|| {
    GaugeVec::new(
        Opts::new(
            "websocket_connections_active",
            "Number of open WebSocket connections",
        )
        .namespace("chat_hub"),
        &["state"], // "open", "bound"
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Users with at least one bound connection
pub static ONLINE_USERS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("online_users", "Number of users currently online").namespace("chat_hub"),
    )
    .expect("Failed to create ONLINE_USERS metric")
});

/// Messages persisted by the dispatcher
pub static MESSAGES_DISPATCHED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("messages_dispatched_total", "Total number of messages persisted and fanned out")
            .namespace("chat_hub"),
    )
    .expect("Failed to create MESSAGES_DISPATCHED_TOTAL metric")
});

/// Live pushes of `message_received`
pub static MESSAGE_DELIVERIES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("message_deliveries_total", "Total number of live message pushes")
            .namespace("chat_hub"),
    )
    .expect("Failed to create MESSAGE_DELIVERIES_TOTAL metric")
});

/// Dropped send attempts by reason
pub static MESSAGES_DROPPED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("messages_dropped_total", "Total number of dropped send attempts")
            .namespace("chat_hub"),
        &["reason"],
    )
    .expect("Failed to create MESSAGES_DROPPED_TOTAL metric")
});

/// Database query duration histogram
pub static DB_QUERY_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];
    HistogramVec::new(
        HistogramOpts::new(
            "db_query_duration_seconds",
            "Database query latency in seconds",
        )
        .namespace("chat_hub")
        .buckets(buckets),
        &["operation", "table"],
    )
    .expect("Failed to create DB_QUERY_DURATION_SECONDS metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(ONLINE_USERS.clone()))
        .expect("Failed to register ONLINE_USERS");
    registry
        .register(Box::new(MESSAGES_DISPATCHED_TOTAL.clone()))
        .expect("Failed to register MESSAGES_DISPATCHED_TOTAL");
    registry
        .register(Box::new(MESSAGE_DELIVERIES_TOTAL.clone()))
        .expect("Failed to register MESSAGE_DELIVERIES_TOTAL");
    registry
        .register(Box::new(MESSAGES_DROPPED_TOTAL.clone()))
        .expect("Failed to register MESSAGES_DROPPED_TOTAL");
    registry
        .register(Box::new(DB_QUERY_DURATION_SECONDS.clone()))
        .expect("Failed to register DB_QUERY_DURATION_SECONDS");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record database query metrics
pub fn record_db_query(operation: &str, table: &str, duration_secs: f64) {
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation, table])
        .observe(duration_secs);
}

/// Helper to update presence gauges after a registry change
pub fn set_presence(open_connections: usize, bound_connections: usize, online_users: usize) {
    WEBSOCKET_CONNECTIONS_ACTIVE
        .with_label_values(&["open"])
        .set(open_connections as f64);
    WEBSOCKET_CONNECTIONS_ACTIVE
        .with_label_values(&["bound"])
        .set(bound_connections as f64);
    ONLINE_USERS.set(online_users as i64);
}

/// Helper to record a persisted message and its live pushes
pub fn record_dispatch(deliveries: usize) {
    MESSAGES_DISPATCHED_TOTAL.inc();
    MESSAGE_DELIVERIES_TOTAL.inc_by(deliveries as u64);
}

/// Helper to record a dropped send attempt
pub fn record_dropped_message(reason: &str) {
    MESSAGES_DROPPED_TOTAL.with_label_values(&[reason]).inc();
}
