//! Student Success API
//!
//! Predicts whether a student will pass from whatever part of their record
//! is known so far. Three scenario models cover the start of the year (S4),
//! after the first period grade (S3) and after the second (S2); requests are
//! routed to the richest applicable model. Every prediction is audited, and
//! the models can be retrained from an uploaded dataset.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::path::Path;
use std::sync::Arc;

use api::state::AppState;
use domain::{DomainError, FeatureTemplate};
use infrastructure::audit::AuditLogFactory;
use infrastructure::services::{DatasetService, InferenceService, ModelRegistry, TrainingService};
use infrastructure::storage::{CsvDatasetRepository, FileModelStore};
use infrastructure::tracking::create_tracking_sink;
use tracing::info;

/// Model registry over the configured models directory
pub fn create_model_registry(config: &AppConfig) -> Arc<ModelRegistry> {
    let store = FileModelStore::new(&config.paths.models_dir);
    Arc::new(ModelRegistry::new(Arc::new(store)))
}

/// Dataset service over the configured canonical CSV
pub fn create_dataset_service(config: &AppConfig) -> Arc<DatasetService> {
    let repository = CsvDatasetRepository::new(&config.paths.dataset);
    Arc::new(DatasetService::new(
        Arc::new(repository),
        config.training.success_threshold,
    ))
}

pub fn create_training_service(
    config: &AppConfig,
    registry: Arc<ModelRegistry>,
    datasets: Arc<DatasetService>,
) -> anyhow::Result<Arc<TrainingService>> {
    let tracker = create_tracking_sink(&config.tracking)?;

    Ok(Arc::new(TrainingService::new(
        registry,
        datasets,
        tracker,
        config.training.clone(),
        config.tracking.experiment_prefix.clone(),
    )))
}

/// Read the feature template; missing or malformed is a startup error
pub async fn load_feature_template(path: &Path) -> Result<FeatureTemplate, DomainError> {
    let json = tokio::fs::read_to_string(path).await.map_err(|e| {
        DomainError::configuration(format!(
            "Cannot read feature template {}: {}",
            path.display(),
            e
        ))
    })?;

    FeatureTemplate::from_json(&json)
}

/// Create the application state from configuration
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let template = load_feature_template(&config.paths.feature_template).await?;
    info!(
        path = %config.paths.feature_template.display(),
        features = template.len(),
        "Feature template loaded"
    );

    let audit = AuditLogFactory::create(&config.audit).await?;
    info!(backend = audit.backend(), "Audit log ready");

    let registry = create_model_registry(config);
    let datasets = create_dataset_service(config);
    let training = create_training_service(config, registry.clone(), datasets.clone())?;
    let inference = Arc::new(InferenceService::new(
        registry.clone(),
        Arc::new(template),
        audit,
    ));

    Ok(AppState::new(inference, training, datasets, registry))
}
