//! Inference service - scenario selection, scoring and audit

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};

use super::model_registry::ModelRegistry;
use crate::domain::{
    label_for, parse_payload, select_scenario, AuditLog, DomainError, FeatureTemplate,
    InferenceRecord, NewInferenceRecord, Prediction,
};
use crate::infrastructure::observability::{record_audit_failure, record_prediction};

/// A computed prediction and the fate of its audit record.
///
/// The prediction stands even when the audit append failed.
#[derive(Debug)]
pub struct PredictionOutcome {
    pub prediction: Prediction,
    pub audit: Result<InferenceRecord, DomainError>,
}

pub struct InferenceService {
    registry: Arc<ModelRegistry>,
    template: Arc<FeatureTemplate>,
    audit: Arc<dyn AuditLog>,
}

impl std::fmt::Debug for InferenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceService")
            .field("template_features", &self.template.len())
            .field("audit_backend", &self.audit.backend())
            .finish()
    }
}

impl InferenceService {
    pub fn new(
        registry: Arc<ModelRegistry>,
        template: Arc<FeatureTemplate>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            registry,
            template,
            audit,
        }
    }

    pub fn template(&self) -> &FeatureTemplate {
        &self.template
    }

    /// Score a raw payload with the model of the scenario its keys select
    pub async fn predict(
        &self,
        payload: Map<String, Value>,
        session_id: Option<String>,
    ) -> Result<PredictionOutcome, DomainError> {
        let features = parse_payload(&payload)?;
        let scenario = select_scenario(&payload);
        let model = self.registry.get(scenario).await?;
        let row = self.template.assemble(&features, scenario);

        let start = Instant::now();
        let probability = model.predict_proba(&row)?;
        let latency = start.elapsed();

        let prediction = Prediction {
            scenario,
            label: label_for(probability),
            probability,
            latency_ms: latency.as_secs_f64() * 1000.0,
        };
        record_prediction(scenario, prediction.label, latency);

        tracing::debug!(
            scenario = %scenario,
            label = prediction.label,
            probability,
            latency_ms = prediction.latency_ms,
            "Scored payload"
        );

        let record = NewInferenceRecord::from_prediction(&prediction, &payload, session_id);
        let audit = match self.audit.append(record).await {
            Ok(stored) => Ok(stored),
            Err(e) => {
                record_audit_failure();
                tracing::error!(scenario = %scenario, error = %e, "Failed to append audit record");
                Err(match e {
                    DomainError::Logging { .. } => e,
                    other => DomainError::logging(other.to_string()),
                })
            }
        };

        Ok(PredictionOutcome { prediction, audit })
    }

    /// The `limit` most recent audit records, newest first
    pub async fn recent(&self, limit: u32) -> Result<Vec<InferenceRecord>, DomainError> {
        self.audit.recent(limit).await
    }

    pub fn audit_backend(&self) -> &'static str {
        self.audit.backend()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::MockAuditLog;
    use crate::domain::dataset::mock::sample_dataset;
    use crate::domain::model::mock::{sample_artifact, MockModelStore};
    use crate::domain::Scenario;
    use crate::infrastructure::audit::InMemoryAuditLog;
    use serde_json::json;

    fn template() -> Arc<FeatureTemplate> {
        Arc::new(FeatureTemplate::from_dataset(&sample_dataset(60)))
    }

    fn registry_with_all_models() -> Arc<ModelRegistry> {
        let store = Scenario::ALL
            .into_iter()
            .fold(MockModelStore::new(), |store, s| {
                store.with_artifact(sample_artifact(s))
            });
        Arc::new(ModelRegistry::new(Arc::new(store)))
    }

    fn service(audit: Arc<dyn AuditLog>) -> InferenceService {
        InferenceService::new(registry_with_all_models(), template(), audit)
    }

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_predict_selects_scenario_and_audits() {
        let audit = Arc::new(InMemoryAuditLog::new());
        let service = service(audit.clone());

        let outcome = service
            .predict(payload(json!({"G1": 15, "G2": 16})), Some("s-1".to_string()))
            .await
            .unwrap();

        let prediction = outcome.prediction;
        assert_eq!(prediction.scenario, Scenario::S2);
        assert!((0.0..=1.0).contains(&prediction.probability));
        assert_eq!(prediction.label, label_for(prediction.probability));
        assert!(prediction.latency_ms >= 0.0);

        let record = outcome.audit.unwrap();
        assert_eq!(record.session_id.as_deref(), Some("s-1"));
        assert_eq!(record.input(), json!({"G1": 15, "G2": 16}));
        assert_eq!(audit.len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_grade_counts_as_present() {
        let service = service(Arc::new(InMemoryAuditLog::new()));

        let outcome = service
            .predict(payload(json!({"G1": 0})), None)
            .await
            .unwrap();

        assert_eq!(outcome.prediction.scenario, Scenario::S3);
    }

    #[tokio::test]
    async fn test_grades_drive_probability() {
        let service = service(Arc::new(InMemoryAuditLog::new()));

        let low = service
            .predict(payload(json!({"G1": 2, "G2": 2})), None)
            .await
            .unwrap();
        let high = service
            .predict(payload(json!({"G1": 18, "G2": 19})), None)
            .await
            .unwrap();

        assert!(high.prediction.probability > low.prediction.probability);
        assert_eq!(high.prediction.label, 1);
        assert_eq!(low.prediction.label, 0);
    }

    #[tokio::test]
    async fn test_empty_payload_uses_defaults_with_s4() {
        let service = service(Arc::new(InMemoryAuditLog::new()));

        let outcome = service.predict(Map::new(), None).await.unwrap();
        assert_eq!(outcome.prediction.scenario, Scenario::S4);
    }

    #[tokio::test]
    async fn test_unknown_feature_is_invalid_input_and_not_audited() {
        let mut audit = MockAuditLog::new();
        audit.expect_append().never();
        let service = service(Arc::new(audit));

        let err = service
            .predict(payload(json!({"G1": 12, "favourite_colour": "red"})), None)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput { .. }));
        assert!(err.to_string().contains("favourite_colour"));
    }

    #[tokio::test]
    async fn test_non_scalar_value_is_invalid_input() {
        let service = service(Arc::new(InMemoryAuditLog::new()));

        let err = service
            .predict(payload(json!({"G1": [1, 2]})), None)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_text_grade_is_invalid_input() {
        let service = service(Arc::new(InMemoryAuditLog::new()));

        let err = service
            .predict(payload(json!({"G1": "twelve"})), None)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_missing_model_error() {
        let registry = Arc::new(ModelRegistry::new(Arc::new(MockModelStore::new())));
        let service =
            InferenceService::new(registry, template(), Arc::new(InMemoryAuditLog::new()));

        let err = service.predict(Map::new(), None).await.unwrap_err();
        assert!(matches!(err, DomainError::ModelMissing { .. }));
    }

    #[tokio::test]
    async fn test_audit_failure_keeps_prediction() {
        let mut audit = MockAuditLog::new();
        audit
            .expect_append()
            .times(1)
            .returning(|_| Err(DomainError::storage("database is locked")));
        let service = service(Arc::new(audit));

        let outcome = service
            .predict(payload(json!({"G1": 12})), None)
            .await
            .unwrap();

        assert_eq!(outcome.prediction.scenario, Scenario::S3);
        let err = outcome.audit.unwrap_err();
        assert!(matches!(err, DomainError::Logging { .. }));
        assert!(err.to_string().contains("database is locked"));
    }
}
