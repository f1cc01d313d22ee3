use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::health;
use super::middleware::metrics_middleware;
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state.
///
/// `/metrics` is mounted only when a Prometheus recorder was installed.
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_check))
        .route("/predict", post(handlers::predict))
        .route("/inferences", get(handlers::list_inferences))
        .route(
            "/upload-data",
            post(handlers::upload_data).layer(DefaultBodyLimit::max(handlers::MAX_UPLOAD_BYTES)),
        )
        .route("/train", post(handlers::train))
        .route("/models/{scenario}", get(handlers::get_model))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware));

    let router = match metrics {
        Some(metrics) => api.merge(create_metrics_router(metrics)),
        None => api,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::TrainingConfig;
    use crate::domain::audit::MockAuditLog;
    use crate::domain::dataset::mock::{sample_dataset, MockDatasetRepository};
    use crate::domain::model::mock::{sample_artifact, MockModelStore};
    use crate::domain::{AuditLog, DomainError, FeatureTemplate, Scenario};
    use crate::infrastructure::audit::InMemoryAuditLog;
    use crate::infrastructure::services::{
        DatasetService, InferenceService, ModelRegistry, TrainingService,
    };
    use crate::infrastructure::tracking::DisabledTracker;

    const BOUNDARY: &str = "student-success-boundary";

    struct TestApp {
        router: Router,
        datasets: Arc<MockDatasetRepository>,
    }

    fn test_app(store: MockModelStore, audit: Arc<dyn AuditLog>) -> TestApp {
        let registry = Arc::new(ModelRegistry::new(Arc::new(store)));
        let template = Arc::new(FeatureTemplate::from_dataset(&sample_dataset(60)));
        let repository = Arc::new(MockDatasetRepository::new().with_dataset(sample_dataset(60)));
        let datasets = Arc::new(DatasetService::new(repository.clone(), 10.0));
        let training = Arc::new(TrainingService::new(
            registry.clone(),
            datasets.clone(),
            Arc::new(DisabledTracker),
            TrainingConfig::default(),
            "student-success",
        ));
        let inference = Arc::new(InferenceService::new(registry.clone(), template, audit));

        TestApp {
            router: create_router(
                AppState::new(inference, training, datasets, registry),
                None,
            ),
            datasets: repository,
        }
    }

    fn all_models() -> MockModelStore {
        Scenario::ALL
            .into_iter()
            .fold(MockModelStore::new(), |store, s| {
                store.with_artifact(sample_artifact(s))
            })
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload(filename: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
             Content-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = filename,
            c = content
        );
        Request::builder()
            .method("POST")
            .uri("/upload-data")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_predict_then_list_inferences() {
        let app = test_app(all_models(), Arc::new(InMemoryAuditLog::new()));

        let (status, body) = send(
            &app.router,
            post_json(
                "/predict",
                json!({"payload": {"G1": 14, "school": "MS"}, "session_id": "abc"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scenario"], "S3");
        let proba = body["pred_proba"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&proba));
        assert_eq!(body["pred_label"], u8::from(proba >= 0.5));

        let (status, body) = send(&app.router, get("/inferences?limit=5")).await;

        assert_eq!(status, StatusCode::OK);
        let inferences = body["inferences"].as_array().unwrap();
        assert_eq!(inferences.len(), 1);
        assert_eq!(inferences[0]["session_id"], "abc");
        assert_eq!(inferences[0]["input"], json!({"G1": 14, "school": "MS"}));
    }

    #[tokio::test]
    async fn test_predict_unknown_feature_is_bad_request() {
        let app = test_app(all_models(), Arc::new(InMemoryAuditLog::new()));

        let (status, body) = send(
            &app.router,
            post_json("/predict", json!({"payload": {"G1": 9, "age": 17}})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_input");
    }

    #[tokio::test]
    async fn test_predict_without_model_is_unavailable() {
        let app = test_app(MockModelStore::new(), Arc::new(InMemoryAuditLog::new()));

        let (status, body) = send(&app.router, post_json("/predict", json!({"payload": {}}))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["type"], "service_unavailable_error");
    }

    #[tokio::test]
    async fn test_predict_audit_failure_returns_prediction() {
        let mut audit = MockAuditLog::new();
        audit
            .expect_append()
            .returning(|_| Err(DomainError::logging("database is locked")));
        audit.expect_backend().return_const("mock");
        let app = test_app(all_models(), Arc::new(audit));

        let (status, body) = send(
            &app.router,
            post_json("/predict", json!({"payload": {"G1": 12, "G2": 13}})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("database is locked"));
        assert_eq!(body["prediction"]["scenario"], "S2");
    }

    #[tokio::test]
    async fn test_health_reports_components() {
        let app = test_app(all_models(), Arc::new(InMemoryAuditLog::new()));

        let (status, body) = send(&app.router, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["models"]["S2"]["exists"], true);
        assert_eq!(body["models"]["S2"]["loaded"], false);
        assert_eq!(body["audit_backend"], "memory");
        assert_eq!(body["data_exists"], true);
        assert_eq!(body["tracking_uri"], "disabled");
    }

    #[tokio::test]
    async fn test_get_model() {
        let app = test_app(all_models(), Arc::new(InMemoryAuditLog::new()));

        let (status, body) = send(&app.router, get("/models/S4")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scenario"], "S4");
        assert_eq!(body["n_samples"], 60);

        let (status, _) = send(&app.router, get("/models/S9")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_replaces_dataset() {
        let app = test_app(all_models(), Arc::new(InMemoryAuditLog::new()));
        let csv = "school,studytime,G1,G2,G3\nGP,2,10,11,12\nMS,1,5,6,7\nGP,3,14,15,16\n";

        let (status, body) = send(&app.router, upload("grades.csv", csv)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "uploaded");
        assert_eq!(body["rows"], 3);
        assert_eq!(body["success_distribution"], json!({"success": 2, "failure": 1}));
        assert_eq!(app.datasets.current().unwrap().n_rows(), 3);
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_files() {
        let app = test_app(all_models(), Arc::new(InMemoryAuditLog::new()));

        let (status, _) = send(&app.router, upload("grades.txt", "G3\n12\n")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app.router, upload("grades.csv", "school,G1\nGP,10\n")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(app.datasets.current().unwrap().n_rows(), 60);
    }

    #[tokio::test]
    async fn test_train_deploys_models() {
        let app = test_app(MockModelStore::new(), Arc::new(InMemoryAuditLog::new()));

        let (status, body) = send(&app.router, post_json("/train", json!({}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "trained");
        assert_eq!(body["n_samples"], 60);
        for scenario in ["S2", "S3", "S4"] {
            assert_eq!(body["models"][scenario]["tracked"], false);
        }

        let (status, body) = send(
            &app.router,
            post_json("/predict", json!({"payload": {"G1": 11}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scenario"], "S3");
    }

    #[tokio::test]
    async fn test_metrics_route_absent_without_recorder() {
        let app = test_app(all_models(), Arc::new(InMemoryAuditLog::new()));

        let response = app.router.clone().oneshot(get("/metrics")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
