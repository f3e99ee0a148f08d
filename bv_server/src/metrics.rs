//! Prometheus metrics for monitoring server health and performance.
//!
//! This module provides metrics collection and export via a dedicated scrape
//! endpoint. Metrics are exposed in Prometheus text format.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts, duration, status codes
//! - **Auth Metrics**: Login attempts, token refreshes
//! - **Rate Limiting**: Requests rejected by the limiter
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use bv_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/auth/login", 200);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Sets up a Prometheus scrape endpoint on the specified address. Metrics
/// will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

/// Record HTTP request.
///
/// Increments the total HTTP request counter with method, path, and status
/// labels.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

/// Record a login attempt, labelled by outcome.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "outcome" => if success { "success" } else { "failure" }
    )
    .increment(1);
}

/// Increment the refresh-token rotation counter.
pub fn token_refreshes_total() {
    metrics::counter!("token_refreshes_total").increment(1);
}

/// Increment the rate-limit rejection counter.
pub fn rate_limit_hits_total() {
    metrics::counter!("rate_limit_hits_total").increment(1);
}
