//! Health endpoint

use std::collections::BTreeMap;

use axum::extract::State;
use serde::Serialize;
use tracing::warn;

use super::state::AppState;
use crate::api::types::Json;
use crate::domain::Scenario;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub models: BTreeMap<Scenario, ModelHealth>,
    pub audit_backend: &'static str,
    pub data_path: String,
    pub data_exists: bool,
    /// Tracker URI, or `disabled`
    pub tracking_uri: String,
}

#[derive(Debug, Serialize)]
pub struct ModelHealth {
    pub path: String,
    pub exists: bool,
    pub loaded: bool,
}

/// GET /health
///
/// Always 200 while the process serves requests; missing models or data show
/// up in the body, not the status.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let models = state
        .registry
        .status()
        .await
        .into_iter()
        .map(|status| {
            (
                status.scenario,
                ModelHealth {
                    path: status.path,
                    exists: status.exists,
                    loaded: status.loaded,
                },
            )
        })
        .collect();

    let data_exists = state.datasets.exists().await.unwrap_or_else(|e| {
        warn!(error = %e, "Could not check training data");
        false
    });

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        models,
        audit_backend: state.inference.audit_backend(),
        data_path: state.datasets.location(),
        data_exists,
        tracking_uri: state
            .training
            .tracking_uri()
            .unwrap_or_else(|| "disabled".to_string()),
    })
}
