//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_audit_failure, record_http_request,
    record_model_scores, record_prediction, record_training_run, PrometheusMetrics,
};
