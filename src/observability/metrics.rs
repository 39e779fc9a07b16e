//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lb_requests_total` (counter): forwarded requests by backend, status
//! - `lb_request_duration_seconds` (histogram): end-to-end latency
//! - `lb_backend_health` (gauge): 1=healthy, 0=unhealthy
//! - `lb_health_transitions_total` (counter): health flips by backend, new state
//!
//! Recording is a no-op until a recorder is installed.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, backend: &str, start: Instant) {
    let status = status.to_string();
    counter!(
        "lb_requests_total",
        "method" => method.to_string(),
        "status" => status,
        "backend" => backend.to_string()
    )
    .increment(1);
    histogram!("lb_request_duration_seconds", "backend" => backend.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_backend_health(backend: &str, healthy: bool) {
    gauge!("lb_backend_health", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_health_transition(backend: &str, healthy: bool) {
    let state = if healthy { "healthy" } else { "unhealthy" };
    counter!(
        "lb_health_transitions_total",
        "backend" => backend.to_string(),
        "state" => state
    )
    .increment(1);
}
