//! Metrics collection for the search server
//!
//! This module defines and manages Prometheus metrics for monitoring search,
//! suggestions and history recording.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    register_int_gauge_vec, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
};

lazy_static! {
    // HTTP Request Metrics

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quill_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "quill_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    /// In-flight HTTP requests
    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGaugeVec = register_int_gauge_vec!(
        "quill_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
        &["method", "path"]
    )
    .expect("Failed to register HTTP_REQUESTS_IN_FLIGHT");

    /// HTTP response size in bytes
    pub static ref HTTP_RESPONSE_SIZE_BYTES: HistogramVec = register_histogram_vec!(
        "quill_http_response_size_bytes",
        "HTTP response size in bytes",
        &["method", "path", "status"],
        vec![100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0]
    )
    .expect("Failed to register HTTP_RESPONSE_SIZE_BYTES");

    // Search Metrics

    /// Searches by sort mode and outcome
    pub static ref SEARCH_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quill_search_total",
        "Total number of searches",
        &["sort", "status"]
    )
    .expect("Failed to register SEARCH_TOTAL");

    /// Total matches per search (before pagination)
    pub static ref SEARCH_RESULTS: HistogramVec = register_histogram_vec!(
        "quill_search_results",
        "Number of items matching a search",
        &["sort"],
        vec![0.0, 1.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0, 10000.0]
    )
    .expect("Failed to register SEARCH_RESULTS");

    /// Page + count query duration
    pub static ref SEARCH_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "quill_search_duration_seconds",
        "Search execution duration in seconds",
        &["sort"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register SEARCH_DURATION_SECONDS");

    // Suggestion Metrics

    /// Suggestion requests by outcome (`served`, `no_match`, `short_circuit`, `error`)
    pub static ref SUGGESTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quill_suggestions_total",
        "Total number of suggestion requests",
        &["outcome"]
    )
    .expect("Failed to register SUGGESTIONS_TOTAL");

    /// Suggestion groups that hit the lookup timeout
    pub static ref SUGGESTION_TIMEOUTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quill_suggestion_timeouts_total",
        "Suggestion lookups that timed out",
        &["group"]
    )
    .expect("Failed to register SUGGESTION_TIMEOUTS_TOTAL");

    // History Metrics

    /// History records persisted
    pub static ref HISTORY_WRITES_TOTAL: IntCounter = register_int_counter!(
        "quill_history_writes_total",
        "Total number of search history records persisted"
    )
    .expect("Failed to register HISTORY_WRITES_TOTAL");

    /// History records lost, by reason (`store_error`, `queue_closed`)
    pub static ref HISTORY_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quill_history_failures_total",
        "Search history records that could not be persisted",
        &["reason"]
    )
    .expect("Failed to register HISTORY_FAILURES_TOTAL");

    // Database Metrics

    /// Active database connections
    pub static ref DB_CONNECTIONS_ACTIVE: IntGauge = register_int_gauge!(
        "quill_db_connections_active",
        "Number of active database connections"
    )
    .expect("Failed to register DB_CONNECTIONS_ACTIVE");

    /// Idle database connections
    pub static ref DB_CONNECTIONS_IDLE: IntGauge = register_int_gauge!(
        "quill_db_connections_idle",
        "Number of idle database connections"
    )
    .expect("Failed to register DB_CONNECTIONS_IDLE");
}

/// Helper to sanitize path for metrics labels (limit cardinality)
pub fn sanitize_path(path: &str) -> String {
    let path = path.strip_prefix("/api").unwrap_or(path);
    let trimmed = path.trim_end_matches('/');

    match trimmed {
        "" => "/".to_string(),
        "/search" | "/search/suggestions" | "/search/history" | "/search/popular"
        | "/health" | "/metrics" => trimmed.to_string(),
        _ => "other".to_string(),
    }
}
