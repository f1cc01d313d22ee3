//! Training service - cross-validate, fit and deploy one model per scenario

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;

use super::dataset_service::DatasetService;
use super::model_registry::ModelRegistry;
use crate::config::TrainingConfig;
use crate::domain::{
    cross_validate, Column, CrossValidationReport, DomainError, ModelArtifact,
    OutcomeDistribution, Pipeline, Scenario, ScenarioConfig, StratifiedKFold, TrackingOutcome,
    TrackingRun, TrackingSink, TrainingDataset,
};
use crate::infrastructure::observability::{record_model_scores, record_training_run};

const MODEL_TYPE: &str = "LogisticRegression";

/// Scores and tracking state of one scenario's new model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub accuracy_cv: f64,
    pub f1_cv: f64,
    pub n_features: usize,
    pub tracked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_error: Option<String>,
}

/// Result of a successful training call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub status: &'static str,
    pub n_samples: usize,
    pub success_distribution: OutcomeDistribution,
    pub models: BTreeMap<Scenario, ScenarioReport>,
    pub tracking_uri: Option<String>,
}

/// A scenario's model fitted in memory, not yet deployed
#[derive(Debug)]
struct FittedScenario {
    scenario: Scenario,
    artifact: ModelArtifact,
    cv: CrossValidationReport,
    n_features: usize,
}

pub struct TrainingService {
    registry: Arc<ModelRegistry>,
    datasets: Arc<DatasetService>,
    tracker: Arc<dyn TrackingSink>,
    config: TrainingConfig,
    experiment_prefix: String,
    in_flight: Mutex<()>,
}

impl std::fmt::Debug for TrainingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainingService")
            .field("config", &self.config)
            .field("experiment_prefix", &self.experiment_prefix)
            .finish()
    }
}

impl TrainingService {
    pub fn new(
        registry: Arc<ModelRegistry>,
        datasets: Arc<DatasetService>,
        tracker: Arc<dyn TrackingSink>,
        config: TrainingConfig,
        experiment_prefix: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            datasets,
            tracker,
            config,
            experiment_prefix: experiment_prefix.into(),
            in_flight: Mutex::new(()),
        }
    }

    pub fn tracking_uri(&self) -> Option<String> {
        self.tracker.uri()
    }

    /// Retrain every scenario from the canonical dataset
    pub async fn train(&self) -> Result<TrainingReport, DomainError> {
        let dataset = self.datasets.current().await?;
        self.train_dataset(dataset).await
    }

    /// Retrain every scenario from `dataset`.
    ///
    /// All scenarios are fitted before any is deployed; one failure aborts
    /// the call with every previous model still in place. Calls are
    /// serialized.
    pub async fn train_dataset(
        &self,
        dataset: TrainingDataset,
    ) -> Result<TrainingReport, DomainError> {
        let _guard = self.in_flight.lock().await;

        let result = self.fit_and_deploy(dataset).await;
        record_training_run(result.is_ok());
        if let Err(e) = &result {
            tracing::error!(error = %e, "Training failed");
        }
        result
    }

    async fn fit_and_deploy(&self, dataset: TrainingDataset) -> Result<TrainingReport, DomainError> {
        let dataset = dataset.with_outcome(self.config.success_threshold)?;
        let success_distribution = dataset.outcome_distribution()?;
        let n_samples = dataset.n_rows();

        tracing::info!(
            n_samples,
            success = success_distribution.success,
            failure = success_distribution.failure,
            "Training started"
        );

        let config = self.config.clone();
        let fitted = tokio::task::spawn_blocking(move || fit_all(&dataset, &config))
            .await
            .map_err(|e| DomainError::internal(format!("Training task failed: {}", e)))??;

        let deployed = self
            .registry
            .replace_all(
                fitted
                    .iter()
                    .map(|f| (f.scenario, f.artifact.clone()))
                    .collect(),
            )
            .await?;

        let mut models = BTreeMap::new();
        for (fit, artifact) in fitted.iter().zip(deployed.iter()) {
            record_model_scores(fit.scenario, fit.cv.accuracy, fit.cv.f1);

            let outcome = TrackingOutcome::from(
                self.tracker
                    .log_run(&self.tracking_run(fit, artifact, n_samples)?)
                    .await,
            );
            if let TrackingOutcome::NotTracked { reason } = &outcome {
                tracing::warn!(scenario = %fit.scenario, reason = %reason, "Run not tracked");
            }

            models.insert(fit.scenario, scenario_report(fit, outcome));
        }

        tracing::info!(n_samples, "Training finished");

        Ok(TrainingReport {
            status: "trained",
            n_samples,
            success_distribution,
            models,
            tracking_uri: self.tracker.uri(),
        })
    }

    fn tracking_run(
        &self,
        fit: &FittedScenario,
        artifact: &ModelArtifact,
        n_samples: usize,
    ) -> Result<TrackingRun, DomainError> {
        let scenario = fit.scenario.as_str();

        Ok(TrackingRun::new(
            format!("{}-{}", self.experiment_prefix, scenario),
            format!("{}_{}", scenario, Utc::now().format("%Y%m%d_%H%M%S")),
        )
        .with_param("scenario", scenario)
        .with_param("n_features", fit.n_features)
        .with_param("n_samples", n_samples)
        .with_param("model_type", MODEL_TYPE)
        .with_param("cv_folds", self.config.folds)
        .with_metric("accuracy_cv", fit.cv.accuracy)
        .with_metric("f1_cv", fit.cv.f1)
        .with_artifact(
            format!("model_{}/model.json", scenario),
            artifact.to_json_bytes()?,
        ))
    }
}

fn fit_all(
    dataset: &TrainingDataset,
    config: &TrainingConfig,
) -> Result<Vec<FittedScenario>, DomainError> {
    let labels = dataset.outcome()?;
    let rows: Vec<usize> = (0..dataset.n_rows()).collect();
    let splitter = StratifiedKFold::new(config.folds, config.seed);
    let classifier = config.classifier();

    Scenario::ALL
        .into_iter()
        .map(|scenario| {
            let failed =
                |e: &dyn std::fmt::Display| DomainError::training(scenario.as_str(), e.to_string());

            let columns: Vec<&Column> =
                ScenarioConfig::feature_columns(scenario, dataset.column_names())
                    .into_iter()
                    .filter_map(|name| dataset.column(name))
                    .collect();
            if columns.is_empty() {
                return Err(failed(&"no feature columns left after exclusions"));
            }

            let cv = cross_validate(&columns, &labels, &splitter, &classifier)
                .map_err(|e| failed(&e))?;
            let pipeline = Pipeline::fit(&columns, &rows, &labels, &classifier)
                .map_err(|e| failed(&e))?;

            tracing::info!(
                scenario = %scenario,
                n_features = columns.len(),
                accuracy_cv = cv.accuracy,
                f1_cv = cv.f1,
                "Scenario fitted"
            );

            Ok(FittedScenario {
                scenario,
                artifact: ModelArtifact::new(scenario, dataset.n_rows(), pipeline),
                n_features: columns.len(),
                cv,
            })
        })
        .collect()
}

fn scenario_report(fit: &FittedScenario, outcome: TrackingOutcome) -> ScenarioReport {
    let (run_id, tracking_error) = match outcome {
        TrackingOutcome::Tracked { run_id } => (Some(run_id), None),
        TrackingOutcome::NotTracked { reason } => (None, Some(reason)),
    };

    ScenarioReport {
        accuracy_cv: round4(fit.cv.accuracy),
        f1_cv: round4(fit.cv.f1),
        n_features: fit.n_features,
        tracked: run_id.is_some(),
        run_id,
        tracking_error,
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
