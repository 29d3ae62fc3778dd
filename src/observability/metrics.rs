//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): proxied requests by method, status, outcome
//! - `relay_request_duration_seconds` (histogram): end-to-end proxy latency
//! - `relay_registrations_total` (counter): registration attempts by result
//! - `relay_master_registered` (gauge): 1 once a master is registered

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one proxied request.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "relay_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("relay_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a registration attempt (`"ok"` or `"rejected"`).
pub fn record_registration(result: &'static str) {
    metrics::counter!("relay_registrations_total", "result" => result).increment(1);
    if result == "ok" {
        metrics::gauge!("relay_master_registered").set(1.0);
    }
}
