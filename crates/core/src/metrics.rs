//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Queue (items enqueued)
//! - Orchestrator (batch runs, item outcomes)
//! - Transfers (bytes and durations for fetch and upload)
//! - External services (source hosts, YouTube, OAuth)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Queue Metrics
// =============================================================================

/// Links enqueued total.
pub static ITEMS_ENQUEUED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("tubestream_items_enqueued_total", "Total links enqueued").unwrap()
});

// =============================================================================
// Orchestrator Metrics
// =============================================================================

/// Batch invocations by outcome.
pub static BATCH_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tubestream_batch_runs_total", "Total batch run invocations"),
        &["outcome"], // "finished", "auth_required", "already_running", "auth_error"
    )
    .unwrap()
});

/// Items uploaded successfully.
pub static ITEMS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tubestream_items_completed_total",
        "Total items uploaded successfully",
    )
    .unwrap()
});

/// Items failed by pipeline phase.
pub static ITEMS_FAILED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tubestream_items_failed_total", "Total items that failed"),
        &["phase"], // "fetch", "upload"
    )
    .unwrap()
});

// =============================================================================
// Transfer Metrics
// =============================================================================

/// Bytes downloaded from source hosts.
pub static BYTES_FETCHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tubestream_bytes_fetched_total",
        "Total bytes downloaded from source hosts",
    )
    .unwrap()
});

/// Bytes transmitted to the upload session endpoint.
pub static BYTES_UPLOADED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tubestream_bytes_uploaded_total",
        "Total bytes sent to upload sessions",
    )
    .unwrap()
});

/// Fetch duration in seconds.
pub static FETCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("tubestream_fetch_duration_seconds", "Duration of fetches").buckets(
            vec![0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0],
        ),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Upload duration in seconds, session initiation included.
pub static UPLOAD_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("tubestream_upload_duration_seconds", "Duration of uploads").buckets(
            vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0, 3600.0],
        ),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tubestream_external_requests_total",
            "Total external service requests",
        ),
        &["service", "result"], // service: "source", "drive", "youtube", "oauth"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Result label for duration and request metrics.
pub fn result_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failed"
    }
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Queue
        Box::new(ITEMS_ENQUEUED.clone()),
        // Orchestrator
        Box::new(BATCH_RUNS.clone()),
        Box::new(ITEMS_COMPLETED.clone()),
        Box::new(ITEMS_FAILED.clone()),
        // Transfers
        Box::new(BYTES_FETCHED.clone()),
        Box::new(BYTES_UPLOADED.clone()),
        Box::new(FETCH_DURATION.clone()),
        Box::new(UPLOAD_DURATION.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
    ]
}
