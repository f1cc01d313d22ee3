//! Model artifact entity and prediction types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::feature::FeatureRow;
use crate::domain::pipeline::Pipeline;
use crate::domain::scenario::Scenario;
use crate::domain::DomainError;

/// Probability at or above which the positive label is predicted
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Label for a positive-class probability
pub fn label_for(probability: f64) -> u8 {
    u8::from(probability >= DECISION_THRESHOLD)
}

/// Trained pipeline for one scenario, as persisted and cached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    scenario: Scenario,
    trained_at: DateTime<Utc>,
    n_samples: usize,
    pipeline: Pipeline,
}

impl ModelArtifact {
    pub fn new(scenario: Scenario, n_samples: usize, pipeline: Pipeline) -> Self {
        Self {
            scenario,
            trained_at: Utc::now(),
            n_samples,
            pipeline,
        }
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.pipeline.feature_names()
    }

    /// Score an assembled row; schema mismatches are the caller's fault
    pub fn predict_proba(&self, row: &FeatureRow) -> Result<f64, DomainError> {
        self.pipeline
            .predict_proba_row(row)
            .map_err(|e| DomainError::invalid_input(e.to_string()))
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, DomainError> {
        serde_json::to_vec(self)
            .map_err(|e| DomainError::internal(format!("Failed to serialize model: {}", e)))
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, DomainError> {
        serde_json::from_slice(bytes)
            .map_err(|e| DomainError::storage(format!("Corrupt model artifact: {}", e)))
    }
}

/// Result of scoring one payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub scenario: Scenario,
    pub label: u8,
    pub probability: f64,
    pub latency_ms: f64,
}
