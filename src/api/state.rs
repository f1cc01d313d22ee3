//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::{
    DatasetService, InferenceService, ModelRegistry, TrainingService,
};

/// Services shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub inference: Arc<InferenceService>,
    pub training: Arc<TrainingService>,
    pub datasets: Arc<DatasetService>,
    pub registry: Arc<ModelRegistry>,
}

impl AppState {
    pub fn new(
        inference: Arc<InferenceService>,
        training: Arc<TrainingService>,
        datasets: Arc<DatasetService>,
        registry: Arc<ModelRegistry>,
    ) -> Self {
        Self {
            inference,
            training,
            datasets,
            registry,
        }
    }
}
