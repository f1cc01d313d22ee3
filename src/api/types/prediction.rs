//! Prediction and audit query types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{ApiError, ApiErrorDetail};
use crate::domain::{InferenceRecord, Prediction, Scenario};

pub const DEFAULT_INFERENCE_LIMIT: u32 = 50;
pub const MAX_INFERENCE_LIMIT: u32 = 1000;

/// POST /predict body
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    /// Student features; G1 and G2 are optional
    pub payload: Map<String, Value>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub scenario: Scenario,
    pub pred_label: u8,
    pub pred_proba: f64,
    pub latency_ms: f64,
}

impl From<&Prediction> for PredictResponse {
    fn from(prediction: &Prediction) -> Self {
        Self {
            scenario: prediction.scenario,
            pred_label: prediction.label,
            pred_proba: prediction.probability,
            latency_ms: prediction.latency_ms,
        }
    }
}

/// Body returned when the prediction succeeded but could not be audited
#[derive(Debug, Clone, Serialize)]
pub struct PredictFailureResponse {
    pub error: ApiErrorDetail,
    pub prediction: PredictResponse,
}

impl PredictFailureResponse {
    pub fn new(error: ApiError, prediction: PredictResponse) -> Self {
        Self {
            error: error.response.error,
            prediction,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InferencesQuery {
    pub limit: Option<u32>,
}

impl InferencesQuery {
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_INFERENCE_LIMIT)
            .min(MAX_INFERENCE_LIMIT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceItem {
    pub id: i64,
    pub ts: DateTime<Utc>,
    pub session_id: Option<String>,
    pub scenario: Scenario,
    pub input: Value,
    pub pred_label: u8,
    pub pred_proba: f64,
}

impl From<InferenceRecord> for InferenceItem {
    fn from(record: InferenceRecord) -> Self {
        Self {
            input: record.input(),
            id: record.id,
            ts: record.ts,
            session_id: record.session_id,
            scenario: record.scenario,
            pred_label: record.pred_label,
            pred_proba: record.pred_proba,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InferencesResponse {
    pub inferences: Vec<InferenceItem>,
}
