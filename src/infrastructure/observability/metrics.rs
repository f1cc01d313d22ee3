//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;
use crate::domain::Scenario;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("student_success_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at /metrics");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record one scored payload
pub fn record_prediction(scenario: Scenario, label: u8, latency: Duration) {
    let labels = [
        ("scenario", scenario.as_str().to_string()),
        ("label", label.to_string()),
    ];

    counter!("predictions_total", &labels).increment(1);
    histogram!("prediction_latency_seconds", "scenario" => scenario.as_str())
        .record(latency.as_secs_f64());
}

pub fn record_audit_failure() {
    counter!("audit_log_failures_total").increment(1);
}

/// Record a finished training call
pub fn record_training_run(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("training_runs_total", "status" => status).increment(1);
}

/// Record the cross-validated scores of a scenario's newly deployed model
pub fn record_model_scores(scenario: Scenario, accuracy: f64, f1: f64) {
    gauge!("model_cv_accuracy", "scenario" => scenario.as_str()).set(accuracy);
    gauge!("model_cv_f1", "scenario" => scenario.as_str()).set(f1);
}
