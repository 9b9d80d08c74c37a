//! Prometheus exporter.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use thiserror::Error;

/// Metrics exporter errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Failed to build the exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),

    /// Failed to install the exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Latency buckets for `*_duration_seconds` histograms.
const DURATION_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must run inside the Tokio runtime; the exporter spawns its own listener.
///
/// # Errors
///
/// Returns an error if the exporter cannot be built or a recorder is
/// already installed.
pub fn install(addr: SocketAddr) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            DURATION_BUCKETS,
        )
        .map_err(|e| MetricsError::Build(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    vibe_core::metrics::describe_metrics();
    describe_counter!(
        vibe_web::HTTP_REQUESTS_TOTAL,
        "Completed HTTP requests by method and status"
    );
    describe_histogram!(
        vibe_web::HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request latency by method"
    );
    tracing::info!(%addr, "Metrics exporter listening at http://{addr}/metrics");
    Ok(())
}
