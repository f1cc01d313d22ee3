//! Model description types

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ModelArtifact, Scenario};

/// GET /models/{scenario} response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub scenario: Scenario,
    pub trained_at: DateTime<Utc>,
    pub n_samples: usize,
    pub features: Vec<String>,
}

impl From<&ModelArtifact> for ModelInfo {
    fn from(artifact: &ModelArtifact) -> Self {
        Self {
            scenario: artifact.scenario(),
            trained_at: artifact.trained_at(),
            n_samples: artifact.n_samples(),
            features: artifact
                .feature_names()
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}
