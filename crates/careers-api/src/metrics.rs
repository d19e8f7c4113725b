//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "careers_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "careers_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "careers_http_requests_in_flight";

    // Aggregation metrics
    pub const APPLICATIONS_ENRICHED_TOTAL: &str = "careers_applications_enriched_total";
    pub const APPLICATIONS_UNRESOLVED_TOTAL: &str = "careers_applications_unresolved_total";

    // Authorization metrics
    pub const AUTH_REJECTIONS_TOTAL: &str = "careers_auth_rejections_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_enriched_applications(count: usize) {
    counter!(names::APPLICATIONS_ENRICHED_TOTAL).increment(count as u64);
}

pub fn record_unresolved_application() {
    counter!(names::APPLICATIONS_UNRESOLVED_TOTAL).increment(1);
}

/// Record a request turned away by the authorization middleware.
pub fn record_auth_rejection(status: u16) {
    let labels = [("status", status.to_string())];
    counter!(names::AUTH_REJECTIONS_TOTAL, &labels).increment(1);
}

/// Metrics middleware for HTTP requests.
///
/// Labels use the route template so ids do not explode cardinality; apply
/// with `route_layer` so the matched path is known.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
