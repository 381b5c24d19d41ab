//! Metrics collection and exposition.
//!
//! # Metrics
//! - `garden_requests_total` (counter): requests by method, route, status
//! - `garden_request_duration_seconds` (histogram): latency distribution
//! - `garden_query_matches` (histogram): plants matched per query
//! - `garden_rate_limited_total` (counter): rejected requests
//! - `garden_store_errors_total` (counter): failed store operations

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("garden_requests_total", &labels).increment(1);
    metrics::histogram!("garden_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_query(endpoint: &str, format: &str, matches: usize) {
    metrics::histogram!(
        "garden_query_matches",
        "endpoint" => endpoint.to_string(),
        "format" => format.to_string()
    )
    .record(matches as f64);
}

pub fn record_rate_limited(reason: &'static str) {
    metrics::counter!("garden_rate_limited_total", "reason" => reason).increment(1);
}

pub fn record_store_error(operation: &'static str) {
    metrics::counter!("garden_store_errors_total", "operation" => operation).increment(1);
}
