//! Observability utilities for the products service.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Product operation metrics
//! - Axum middleware for automatic request metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, ProductMetrics};
//!
//! init_metrics()?;
//!
//! ProductMetrics::record_operation("create", Outcome::Success);
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod middleware;
pub mod products;

pub use middleware::metrics_middleware;
pub use products::{Outcome, ProductMetrics};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder as the global `metrics` recorder.
///
/// Call once at startup; later calls return the existing handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();
        Ok(handle)
    })
}

pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    // HTTP metrics
    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    // Product metrics
    describe_counter!(
        "product_operations_total",
        "Product operations by operation and outcome"
    );
    describe_histogram!(
        "product_search_results",
        "Number of products returned by list and search operations"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recorded_metrics_are_rendered() {
        let handle = init_metrics().unwrap();
        assert!(std::ptr::eq(handle, init_metrics().unwrap()));

        ProductMetrics::record_operation("create", Outcome::Success);
        ProductMetrics::record_search_results("search", 4);

        let rendered = metrics_handler().await;
        assert!(rendered.contains("product_operations_total"));
        assert!(rendered.contains("outcome=\"success\""));
        assert!(rendered.contains("product_search_results"));
    }
}
