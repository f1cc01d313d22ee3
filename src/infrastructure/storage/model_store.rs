//! Model artifacts as JSON files, one per scenario

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::fs::write_atomic;
use crate::domain::{DomainError, ModelArtifact, ModelStore, Scenario};

/// Artifact store rooted at a models directory
#[derive(Debug, Clone)]
pub struct FileModelStore {
    dir: PathBuf,
}

impl FileModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, scenario: Scenario) -> PathBuf {
        self.dir.join(scenario.artifact_file_name())
    }
}

#[async_trait]
impl ModelStore for FileModelStore {
    async fn load(&self, scenario: Scenario) -> Result<Option<ModelArtifact>, DomainError> {
        let path = self.path(scenario);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let artifact = ModelArtifact::from_json_bytes(&bytes)?;
        if artifact.scenario() != scenario {
            return Err(DomainError::storage(format!(
                "{} holds a model for {}",
                path.display(),
                artifact.scenario()
            )));
        }

        tracing::debug!(scenario = %scenario, path = %path.display(), "Loaded model artifact");
        Ok(Some(artifact))
    }

    async fn save(&self, scenario: Scenario, artifact: &ModelArtifact) -> Result<(), DomainError> {
        let path = self.path(scenario);
        let bytes = artifact.to_json_bytes()?;

        write_atomic(&path, &bytes).await?;

        tracing::info!(scenario = %scenario, path = %path.display(), "Persisted model artifact");
        Ok(())
    }

    async fn remove(&self, scenario: Scenario) -> Result<(), DomainError> {
        let path = self.path(scenario);

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(scenario = %scenario, path = %path.display(), "Removed model artifact");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, scenario: Scenario) -> Result<bool, DomainError> {
        fs::try_exists(self.path(scenario))
            .await
            .map_err(|e| DomainError::storage(format!("Failed to stat model: {}", e)))
    }

    fn location(&self, scenario: Scenario) -> String {
        self.path(scenario).display().to_string()
    }
}
