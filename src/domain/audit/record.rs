//! Inference audit records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::model::Prediction;
use crate::domain::scenario::Scenario;

/// Audit entry to be appended; the store assigns the row id
#[derive(Debug, Clone, PartialEq)]
pub struct NewInferenceRecord {
    pub ts: DateTime<Utc>,
    pub session_id: Option<String>,
    pub scenario: Scenario,
    pub input_json: String,
    pub pred_label: u8,
    pub pred_proba: f64,
}

impl NewInferenceRecord {
    /// Record of `prediction` for the caller's raw, unassembled payload
    pub fn from_prediction(
        prediction: &Prediction,
        raw_payload: &serde_json::Map<String, serde_json::Value>,
        session_id: Option<String>,
    ) -> Self {
        Self {
            ts: Utc::now(),
            session_id,
            scenario: prediction.scenario,
            input_json: serde_json::Value::Object(raw_payload.clone()).to_string(),
            pred_label: prediction.label,
            pred_proba: prediction.probability,
        }
    }

    pub fn with_id(self, id: i64) -> InferenceRecord {
        InferenceRecord {
            id,
            ts: self.ts,
            session_id: self.session_id,
            scenario: self.scenario,
            input_json: self.input_json,
            pred_label: self.pred_label,
            pred_proba: self.pred_proba,
        }
    }
}

/// Persisted audit entry, immutable once written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRecord {
    pub id: i64,
    pub ts: DateTime<Utc>,
    pub session_id: Option<String>,
    pub scenario: Scenario,
    pub input_json: String,
    pub pred_label: u8,
    pub pred_proba: f64,
}

impl InferenceRecord {
    /// The stored input decoded back to JSON, or the raw string if it is not JSON
    pub fn input(&self) -> serde_json::Value {
        serde_json::from_str(&self.input_json)
            .unwrap_or_else(|_| serde_json::Value::String(self.input_json.clone()))
    }
}
