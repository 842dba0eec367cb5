// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the DNS portal.
//!
//! All metrics use the `dnsportal_firestoned_io_` prefix (prometheus-safe version of
//! "dnsportal.firestoned.io") and are exposed on the `/metrics` endpoint.
//!
//! # Metrics Categories
//!
//! - **Refresh Metrics** - Snapshot refresh outcomes, durations and sizes
//! - **Stream Metrics** - Open subscribers and emitted diff events
//! - **Query Metrics** - List requests and DNS sync checks
//!
//! # Example
//!
//! ```rust,no_run
//! use dnsportal::metrics::record_refresh_success;
//!
//! record_refresh_success(std::time::Duration::from_millis(120), 42, 7);
//! ```

use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all portal metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "dnsportal_firestoned_io";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Refresh Metrics
// ============================================================================

/// Total number of snapshot refreshes by outcome
///
/// Labels:
/// - `status`: Outcome (`success`, `error`)
pub static REFRESH_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_refreshes_total"),
        "Total number of snapshot refreshes by status",
    );
    let counter = CounterVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of snapshot refreshes in seconds
///
/// Labels:
/// - `status`: Outcome (`success`, `error`)
pub static REFRESH_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_refresh_duration_seconds"),
        "Duration of snapshot refreshes in seconds by status",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Number of FQDN records in the current snapshot
pub static SNAPSHOT_RECORDS: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_snapshot_records"),
        "Number of FQDN records in the current snapshot",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Generation of the current snapshot (0 until the first successful refresh)
pub static SNAPSHOT_GENERATION: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_snapshot_generation"),
        "Generation of the current snapshot",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Stream Metrics
// ============================================================================

/// Number of currently open stream subscribers
pub static STREAMS_ACTIVE: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_streams_active"),
        "Number of currently open FQDN stream subscribers",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Total number of stream events emitted by type
///
/// Labels:
/// - `event_type`: `added`, `modified`, `deleted`
pub static STREAM_EVENTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_stream_events_total"),
        "Total number of FQDN stream events by type",
    );
    let counter = CounterVec::new(opts, &["event_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Query Metrics
// ============================================================================

/// Total number of list requests by where the data came from
///
/// Labels:
/// - `consistency`: `live` (backing store) or `cached` (last good snapshot)
pub static LIST_REQUESTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_list_requests_total"),
        "Total number of FQDN list requests by consistency",
    );
    let counter = CounterVec::new(opts, &["consistency"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of DNS sync checks by resulting status
///
/// Labels:
/// - `status`: `sync`, `notsync`, `notavailable`
pub static SYNC_CHECKS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_sync_checks_total"),
        "Total number of DNS sync checks by status",
    );
    let counter = CounterVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful refresh
///
/// # Arguments
/// * `duration` - Time spent scanning and aggregating
/// * `records` - Number of FQDN records in the committed snapshot
/// * `generation` - Generation of the committed snapshot
#[allow(clippy::cast_precision_loss)]
pub fn record_refresh_success(duration: Duration, records: usize, generation: u64) {
    REFRESH_TOTAL.with_label_values(&["success"]).inc();
    REFRESH_DURATION_SECONDS
        .with_label_values(&["success"])
        .observe(duration.as_secs_f64());
    SNAPSHOT_RECORDS.set(records as f64);
    SNAPSHOT_GENERATION.set(generation as f64);
}

/// Record a failed refresh (the previous snapshot is kept)
pub fn record_refresh_error(duration: Duration) {
    REFRESH_TOTAL.with_label_values(&["error"]).inc();
    REFRESH_DURATION_SECONDS
        .with_label_values(&["error"])
        .observe(duration.as_secs_f64());
}

/// Record a stream subscriber opening
pub fn record_stream_opened() {
    STREAMS_ACTIVE.inc();
}

/// Record a stream subscriber closing
pub fn record_stream_closed() {
    STREAMS_ACTIVE.dec();
}

/// Record an emitted stream event
pub fn record_stream_event(event_type: &str) {
    STREAM_EVENTS_TOTAL.with_label_values(&[event_type]).inc();
}

/// Record a list request
pub fn record_list_request(consistency: &str) {
    LIST_REQUESTS_TOTAL.with_label_values(&[consistency]).inc();
}

/// Record a sync check result
pub fn record_sync_check(status: &str) {
    SYNC_CHECKS_TOTAL.with_label_values(&[status]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_refresh_success() {
        record_refresh_success(Duration::from_millis(500), 12, 3);

        let counter = REFRESH_TOTAL.with_label_values(&["success"]);
        assert!(counter.get() > 0.0);

        let histogram = REFRESH_DURATION_SECONDS.with_label_values(&["success"]);
        assert!(histogram.get_sample_count() > 0);
    }

    #[test]
    fn test_record_refresh_error() {
        record_refresh_error(Duration::from_millis(250));

        let counter = REFRESH_TOTAL.with_label_values(&["error"]);
        assert!(counter.get() > 0.0);
    }

    #[test]
    fn test_gather_metrics() {
        record_sync_check("sync");
        record_stream_event("added");

        let result = gather_metrics();
        assert!(result.is_ok(), "Gathering metrics should succeed");

        let metrics_text = result.unwrap();
        assert!(
            metrics_text.contains("dnsportal_firestoned_io"),
            "Metrics should contain namespace prefix"
        );
        assert!(
            metrics_text.contains("sync_checks_total"),
            "Metrics should contain sync check counter"
        );
    }
}
