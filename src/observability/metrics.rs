//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_requests_total` (counter): requests by route, status
//! - `site_request_duration_seconds` (histogram): latency distribution
//! - `site_rate_limited_total` (counter): rejected submissions by scope
//! - `site_locale_redirects_total` (counter): redirects by kind
//! - `site_store_errors_total` (counter): durable store failures by operation
//! - `site_contact_submissions_total` (counter): contact outcomes

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

/// Label for the route a request matched. Pages served by the static
/// fallback share one label.
pub fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "fallback".to_string())
}

pub fn record_request(route: String, status: u16, start: Instant) {
    metrics::counter!(
        "site_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("site_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(scope: &str) {
    metrics::counter!("site_rate_limited_total", "scope" => scope.to_string()).increment(1);
}

pub fn record_locale_redirect(kind: &'static str) {
    metrics::counter!("site_locale_redirects_total", "kind" => kind).increment(1);
}

pub fn record_store_error(op: &'static str) {
    metrics::counter!("site_store_errors_total", "op" => op).increment(1);
}

pub fn record_contact(outcome: &'static str) {
    metrics::counter!("site_contact_submissions_total", "outcome" => outcome).increment(1);
}

/// Middleware counting every request and its latency.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let route = route_label(&request);
    let response = next.run(request).await;
    record_request(route, response.status().as_u16(), start);
    response
}
