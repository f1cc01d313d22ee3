//! MLflow tracking server client over its REST API

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::domain::tracking::TrackingArtifact;
use crate::domain::{DomainError, TrackingRun, TrackingSink};

const API: &str = "api/2.0/mlflow";
const ARTIFACTS_API: &str = "api/2.0/mlflow-artifacts/artifacts";
const PROXIED_ARTIFACT_SCHEME: &str = "mlflow-artifacts:";

#[derive(Debug, Deserialize)]
struct GetExperimentResponse {
    experiment: ExperimentInfo,
}

#[derive(Debug, Deserialize)]
struct ExperimentInfo {
    experiment_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateExperimentResponse {
    experiment_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateRunResponse {
    run: RunResponse,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    info: RunInfo,
}

#[derive(Debug, Deserialize)]
struct RunInfo {
    run_id: String,
    #[serde(default)]
    artifact_uri: String,
}

#[derive(Debug, Deserialize)]
struct Empty {}

/// MLflow client; experiments are looked up by name and created on demand
#[derive(Debug, Clone)]
pub struct MlflowTracker {
    client: reqwest::Client,
    base_url: String,
}

impl MlflowTracker {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}/{}", self.base_url, API, endpoint)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<T, DomainError> {
        let response = self
            .client
            .post(self.url(endpoint))
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::tracking(format!("{} request failed: {}", endpoint, e)))?;

        Self::decode(endpoint, response).await
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, DomainError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::tracking(format!(
                "{} returned HTTP {}: {}",
                endpoint, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::tracking(format!("{} response unreadable: {}", endpoint, e)))
    }

    /// Id of the named experiment, creating it if it does not exist yet
    async fn experiment_id(&self, name: &str) -> Result<String, DomainError> {
        let response = self
            .client
            .get(self.url("experiments/get-by-name"))
            .query(&[("experiment_name", name)])
            .send()
            .await
            .map_err(|e| DomainError::tracking(format!("experiment lookup failed: {}", e)))?;

        if response.status() != reqwest::StatusCode::NOT_FOUND {
            let found: GetExperimentResponse =
                Self::decode("experiments/get-by-name", response).await?;
            return Ok(found.experiment.experiment_id);
        }

        let created: CreateExperimentResponse = self
            .post("experiments/create", json!({ "name": name }))
            .await?;
        tracing::info!(experiment = %name, id = %created.experiment_id, "Created experiment");
        Ok(created.experiment_id)
    }

    async fn upload_artifact(
        &self,
        artifact_uri: &str,
        artifact: &TrackingArtifact,
    ) -> Result<(), DomainError> {
        let root = artifact_root(artifact_uri)?;
        let url = format!(
            "{}/{}/{}/{}",
            self.base_url,
            ARTIFACTS_API,
            root,
            artifact.path.trim_start_matches('/')
        );

        let response = self
            .client
            .put(url)
            .body(artifact.content.clone())
            .send()
            .await
            .map_err(|e| DomainError::tracking(format!("artifact upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::tracking(format!(
                "artifact upload returned HTTP {}: {}",
                status, body
            )));
        }

        Ok(())
    }

    async fn set_status(&self, run_id: &str, status: &str) -> Result<(), DomainError> {
        let _: Empty = self
            .post(
                "runs/update",
                json!({
                    "run_id": run_id,
                    "status": status,
                    "end_time": Utc::now().timestamp_millis(),
                }),
            )
            .await?;
        Ok(())
    }

    async fn fill_run(&self, info: &RunInfo, run: &TrackingRun) -> Result<(), DomainError> {
        let timestamp = Utc::now().timestamp_millis();
        let params: Vec<_> = run
            .params
            .iter()
            .map(|(key, value)| json!({ "key": key, "value": value }))
            .collect();
        let metrics: Vec<_> = run
            .metrics
            .iter()
            .map(|(key, value)| {
                json!({ "key": key, "value": value, "timestamp": timestamp, "step": 0 })
            })
            .collect();

        let _: Empty = self
            .post(
                "runs/log-batch",
                json!({ "run_id": info.run_id, "params": params, "metrics": metrics }),
            )
            .await?;

        if let Some(artifact) = &run.artifact {
            self.upload_artifact(&info.artifact_uri, artifact).await?;
        }

        self.set_status(&info.run_id, "FINISHED").await
    }
}

/// Artifact path on the tracking server's proxied artifact store
fn artifact_root(artifact_uri: &str) -> Result<&str, DomainError> {
    match artifact_uri.strip_prefix(PROXIED_ARTIFACT_SCHEME) {
        Some(rest) if !rest.starts_with("//") => Ok(rest.trim_matches('/')),
        _ => Err(DomainError::tracking(format!(
            "unsupported artifact store '{}'",
            artifact_uri
        ))),
    }
}

#[async_trait]
impl TrackingSink for MlflowTracker {
    async fn log_run(&self, run: &TrackingRun) -> Result<String, DomainError> {
        let experiment_id = self.experiment_id(&run.experiment).await?;

        let created: CreateRunResponse = self
            .post(
                "runs/create",
                json!({
                    "experiment_id": experiment_id,
                    "run_name": run.run_name,
                    "start_time": run.started_at.timestamp_millis(),
                    "tags": [{ "key": "mlflow.runName", "value": run.run_name }],
                }),
            )
            .await?;
        let info = created.run.info;

        if let Err(e) = self.fill_run(&info, run).await {
            if let Err(status_err) = self.set_status(&info.run_id, "FAILED").await {
                tracing::warn!(run_id = %info.run_id, error = %status_err, "Failed to mark run failed");
            }
            return Err(e);
        }

        tracing::info!(
            experiment = %run.experiment,
            run_id = %info.run_id,
            "Logged training run"
        );
        Ok(info.run_id)
    }

    fn uri(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tracker(server: &MockServer) -> MlflowTracker {
        MlflowTracker::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn run() -> TrackingRun {
        TrackingRun::new("student-success-S2", "S2_20240101_120000")
            .with_param("scenario", "S2")
            .with_param("cv_folds", 5)
            .with_metric("accuracy_cv", 0.9)
            .with_metric("f1_cv", 0.88)
            .with_artifact("model_S2/model.json", b"{\"k\":1}".to_vec())
    }

    async fn mount_run_endpoints(server: &MockServer, artifact_uri: &str) {
        Mock::given(method("POST"))
            .and(path("/api/2.0/mlflow/runs/create"))
            .and(body_partial_json(json!({
                "experiment_id": "7",
                "run_name": "S2_20240101_120000"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "run": { "info": { "run_id": "run-42", "artifact_uri": artifact_uri } }
            })))
            .expect(1)
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/2.0/mlflow/runs/log-batch"))
            .and(body_partial_json(json!({
                "run_id": "run-42",
                "params": [
                    { "key": "scenario", "value": "S2" },
                    { "key": "cv_folds", "value": "5" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_log_run_with_existing_experiment() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/2.0/mlflow/experiments/get-by-name"))
            .and(query_param("experiment_name", "student-success-S2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "experiment": { "experiment_id": "7", "name": "student-success-S2" }
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_run_endpoints(&server, "mlflow-artifacts:/7/run-42/artifacts").await;

        Mock::given(method("PUT"))
            .and(path(
                "/api/2.0/mlflow-artifacts/artifacts/7/run-42/artifacts/model_S2/model.json",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/2.0/mlflow/runs/update"))
            .and(body_partial_json(json!({ "run_id": "run-42", "status": "FINISHED" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let run_id = tracker(&server).log_run(&run()).await.unwrap();
        assert_eq!(run_id, "run-42");
    }

    #[tokio::test]
    async fn test_missing_experiment_is_created() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/2.0/mlflow/experiments/get-by-name"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error_code": "RESOURCE_DOES_NOT_EXIST"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/2.0/mlflow/experiments/create"))
            .and(body_partial_json(json!({ "name": "student-success-S2" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "experiment_id": "7" })))
            .expect(1)
            .mount(&server)
            .await;
        mount_run_endpoints(&server, "mlflow-artifacts:/7/run-42/artifacts").await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/2.0/mlflow/runs/update"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        assert_eq!(tracker(&server).log_run(&run()).await.unwrap(), "run-42");
    }

    #[tokio::test]
    async fn test_unsupported_artifact_store_fails_run() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/2.0/mlflow/experiments/get-by-name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "experiment": { "experiment_id": "7" }
            })))
            .mount(&server)
            .await;
        mount_run_endpoints(&server, "s3://bucket/7/run-42/artifacts").await;
        Mock::given(method("POST"))
            .and(path("/api/2.0/mlflow/runs/update"))
            .and(body_partial_json(json!({ "run_id": "run-42", "status": "FAILED" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let err = tracker(&server).log_run(&run()).await.unwrap_err();
        assert!(err.to_string().contains("unsupported artifact store"));
    }

    #[tokio::test]
    async fn test_server_error_is_tracking_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = tracker(&server).log_run(&run()).await.unwrap_err();
        assert!(matches!(err, DomainError::Tracking { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_tracking_error() {
        let tracker = MlflowTracker::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let err = tracker.log_run(&run()).await.unwrap_err();
        assert!(matches!(err, DomainError::Tracking { .. }));
    }

    #[test]
    fn test_artifact_root() {
        assert_eq!(
            artifact_root("mlflow-artifacts:/1/abc/artifacts").unwrap(),
            "1/abc/artifacts"
        );
        assert!(artifact_root("mlflow-artifacts://host:5000/1/abc").is_err());
        assert!(artifact_root("file:///mlruns/1/abc/artifacts").is_err());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let tracker = MlflowTracker::new("http://mlflow:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(tracker.uri().as_deref(), Some("http://mlflow:5000"));
        assert_eq!(
            tracker.url("runs/create"),
            "http://mlflow:5000/api/2.0/mlflow/runs/create"
        );
    }
}
