//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mvc_requests_total` (counter): dispatched actions by controller, action, status
//! - `mvc_request_duration_seconds` (histogram): dispatch latency by controller, action
//! - `mvc_not_found_total` (counter): requests answered 404 before an action ran, by reason
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is optional and serves its own listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(controller: &str, action: &str, status: u16, start: Instant) {
    metrics::counter!(
        "mvc_requests_total",
        "controller" => controller.to_string(),
        "action" => action.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "mvc_request_duration_seconds",
        "controller" => controller.to_string(),
        "action" => action.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_not_found(reason: &'static str) {
    metrics::counter!("mvc_not_found_total", "reason" => reason).increment(1);
}
