//! Infrastructure services

mod dataset_service;
mod inference_service;
mod model_registry;
mod training_service;

pub use dataset_service::{DatasetService, UploadSummary};
pub use inference_service::{InferenceService, PredictionOutcome};
pub use model_registry::{ModelRegistry, ModelStatus};
pub use training_service::{ScenarioReport, TrainingReport, TrainingService};
