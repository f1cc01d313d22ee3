//! Model artifact storage trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::ModelArtifact;
use crate::domain::scenario::Scenario;
use crate::domain::DomainError;

/// Stable storage of one artifact per scenario
#[async_trait]
pub trait ModelStore: Send + Sync + Debug {
    /// Load the persisted artifact, `None` if none was ever saved
    async fn load(&self, scenario: Scenario) -> Result<Option<ModelArtifact>, DomainError>;

    /// Persist an artifact, replacing the previous one atomically
    async fn save(&self, scenario: Scenario, artifact: &ModelArtifact) -> Result<(), DomainError>;

    /// Delete the persisted artifact; absent is not an error
    async fn remove(&self, scenario: Scenario) -> Result<(), DomainError>;

    /// Whether an artifact is persisted for `scenario`
    async fn exists(&self, scenario: Scenario) -> Result<bool, DomainError>;

    /// Human readable location of the artifact
    fn location(&self, scenario: Scenario) -> String;
}
