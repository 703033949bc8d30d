//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mock_requests_total` (counter): requests by method and outcome
//! - `mock_request_duration_seconds` (histogram): dispatch latency
//! - `mock_handlers_loaded` (gauge): handlers registered at startup
//! - `mock_descriptor_failures_total` (counter): rejected descriptors by stage
//!
//! # Design Decisions
//! - Recording is always on; without an installed exporter the macros are no-ops
//! - The Prometheus exporter serves its own HTTP listener

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_request(method: &str, outcome: &'static str, start: Instant) {
    counter!(
        "mock_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "mock_request_duration_seconds",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record how many handlers the dispatcher holds.
pub fn record_handlers_loaded(count: usize) {
    gauge!("mock_handlers_loaded").set(count as f64);
}

/// Record a descriptor rejected at `stage` (load, validate or register).
pub fn record_descriptor_failure(stage: &'static str) {
    counter!("mock_descriptor_failures_total", "stage" => stage).increment(1);
}
