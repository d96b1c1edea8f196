//! Metrics collection and exposition.
//!
//! # Metrics
//! - `figure_requests_total` (counter): requests by outcome, status
//! - `figure_request_duration_seconds` (histogram): latency by outcome
//! - `figure_upstream_requests_total` (counter): ML service answers by status
//!
//! Without an installed recorder the macros are no-ops, so handlers record
//! unconditionally.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a finished figure request.
pub fn record_figure_request(outcome: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "figure_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!("figure_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record the status the ML service answered with.
pub fn record_upstream_response(status: u16) {
    metrics::counter!("figure_upstream_requests_total", "status" => status.to_string())
        .increment(1);
}
