//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by route kind, status
//! - `proxy_request_duration_seconds` (histogram): latency by route kind
//! - `proxy_upstream_errors_total` (counter): forwarding failures by kind
//! - `proxy_size_limit_redirects_total` (counter): oversize redirects

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape listener and install the global recorder.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record one finished proxied request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    metrics::counter!("proxy_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}
