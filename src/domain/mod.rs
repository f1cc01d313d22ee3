//! Domain layer - Core business logic and entities

pub mod audit;
pub mod dataset;
pub mod error;
pub mod feature;
pub mod model;
pub mod pipeline;
pub mod scenario;
pub mod tracking;

pub use audit::{AuditLog, InferenceRecord, NewInferenceRecord};
pub use dataset::{Column, ColumnData, DatasetRepository, OutcomeDistribution, TrainingDataset};
pub use error::DomainError;
pub use feature::{parse_payload, FeaturePayload, FeatureRow, FeatureTemplate, FeatureValue};
pub use model::{label_for, ModelArtifact, ModelStore, Prediction, DECISION_THRESHOLD};
pub use pipeline::{
    cross_validate, CrossValidationReport, LogisticRegressionConfig, Pipeline, PipelineError,
    StratifiedKFold,
};
pub use scenario::{select_scenario, Scenario, ScenarioConfig};
pub use tracking::{TrackingOutcome, TrackingRun, TrackingSink};
