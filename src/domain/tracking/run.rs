//! Tracking run bundle and outcome

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// File attached to a run
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingArtifact {
    /// Path relative to the run's artifact root
    pub path: String,
    pub content: Vec<u8>,
}

/// Parameters, metrics and artifact of one scenario's training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingRun {
    pub experiment: String,
    pub run_name: String,
    pub started_at: DateTime<Utc>,
    pub params: Vec<(String, String)>,
    pub metrics: Vec<(String, f64)>,
    pub artifact: Option<TrackingArtifact>,
}

impl TrackingRun {
    pub fn new(experiment: impl Into<String>, run_name: impl Into<String>) -> Self {
        Self {
            experiment: experiment.into(),
            run_name: run_name.into(),
            started_at: Utc::now(),
            params: Vec::new(),
            metrics: Vec::new(),
            artifact: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn with_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.metrics.push((key.into(), value));
        self
    }

    pub fn with_artifact(mut self, path: impl Into<String>, content: Vec<u8>) -> Self {
        self.artifact = Some(TrackingArtifact {
            path: path.into(),
            content,
        });
        self
    }
}

/// Whether a run reached the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrackingOutcome {
    Tracked { run_id: String },
    NotTracked { reason: String },
}

impl TrackingOutcome {
    pub fn is_tracked(&self) -> bool {
        matches!(self, Self::Tracked { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Tracked { .. } => None,
            Self::NotTracked { reason } => Some(reason),
        }
    }
}

impl From<Result<String, DomainError>> for TrackingOutcome {
    fn from(result: Result<String, DomainError>) -> Self {
        match result {
            Ok(run_id) => Self::Tracked { run_id },
            Err(e) => Self::NotTracked {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let run = TrackingRun::new("student-success-S2", "S2_20240101_120000")
            .with_param("cv_folds", 5)
            .with_metric("accuracy_cv", 0.91)
            .with_artifact("model_S2/model.json", b"{}".to_vec());

        assert_eq!(run.params, vec![("cv_folds".to_string(), "5".to_string())]);
        assert_eq!(run.metrics.len(), 1);
        assert_eq!(run.artifact.unwrap().path, "model_S2/model.json");
    }

    #[test]
    fn test_outcome_from_result() {
        let tracked = TrackingOutcome::from(Ok::<_, DomainError>("run-1".to_string()));
        assert!(tracked.is_tracked());
        assert_eq!(tracked.reason(), None);

        let failed = TrackingOutcome::from(Err(DomainError::tracking("connection refused")));
        assert!(!failed.is_tracked());
        assert_eq!(failed.reason(), Some("Tracking error: connection refused"));
    }
}
