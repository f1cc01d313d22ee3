//! Canonical dataset repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::TrainingDataset;
use crate::domain::DomainError;

/// Storage of the single canonical training dataset
#[async_trait]
pub trait DatasetRepository: Send + Sync + Debug {
    /// Load the canonical dataset, `None` if nothing was uploaded yet
    async fn load(&self) -> Result<Option<TrainingDataset>, DomainError>;

    /// Replace the canonical dataset wholesale
    async fn replace(&self, dataset: &TrainingDataset) -> Result<(), DomainError>;

    /// Whether a canonical dataset exists
    async fn exists(&self) -> Result<bool, DomainError>;

    /// Human readable location, for health reporting
    fn location(&self) -> String;
}
