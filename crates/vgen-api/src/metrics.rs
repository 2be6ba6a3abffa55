//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder.
///
/// Media and storage metrics recorded through the `metrics` facade are
/// exported by the same handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "vgen_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vgen_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "vgen_http_requests_in_flight";
    pub const RATE_LIMIT_HITS_TOTAL: &str = "vgen_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Collapse ids and file paths so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut segments = path.split('/');
    while let Some(segment) = segments.next() {
        match out.last().copied() {
            Some("status" | "download" | "file") if out.contains(&"video") => {
                out.push(":video_id")
            }
            Some("metrics") if out.contains(&"cloud") => out.push(":video_id"),
            Some("preview") => out.push(":style"),
            Some("info") => {
                out.push(":video_path");
                break;
            }
            _ => out.push(segment),
        }
    }
    out.join("/")
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/api/video/status/550e8400-e29b-41d4-a716-446655440000"),
            "/api/video/status/:video_id"
        );
        assert_eq!(
            sanitize_path("/api/editor/info/tmp/video_editing/edited_a.mp4"),
            "/api/editor/info/:video_path"
        );
        assert_eq!(sanitize_path("/api/styles/preview/anime"), "/api/styles/preview/:style");
        assert_eq!(sanitize_path("/api/cloud/metrics/abc"), "/api/cloud/metrics/:video_id");
        assert_eq!(sanitize_path("/api/cloud/status"), "/api/cloud/status");
        assert_eq!(sanitize_path("/metrics"), "/metrics");
    }
}
