//! Model registry - lazily loaded, swappable per-scenario artifacts

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::domain::{DomainError, ModelArtifact, ModelStore, Scenario};

/// Persisted and in-memory state of one scenario's model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub scenario: Scenario,
    pub path: String,
    pub exists: bool,
    pub loaded: bool,
}

/// Single source of the current model per scenario.
///
/// Readers clone an `Arc` out of the cache and never hold the lock across an
/// await. Writers are serialized and persist before swapping, so a reader
/// sees either the old or the new artifact, and a restart sees what live
/// callers saw.
#[derive(Debug)]
pub struct ModelRegistry {
    store: Arc<dyn ModelStore>,
    cache: RwLock<HashMap<Scenario, Arc<ModelArtifact>>>,
    writer: Mutex<()>,
}

impl ModelRegistry {
    pub fn new(store: Arc<dyn ModelStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
            writer: Mutex::new(()),
        }
    }

    fn cached(&self, scenario: Scenario) -> Option<Arc<ModelArtifact>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&scenario)
            .cloned()
    }

    /// Current model for `scenario`, loading it from the store on first use
    pub async fn get(&self, scenario: Scenario) -> Result<Arc<ModelArtifact>, DomainError> {
        if let Some(artifact) = self.cached(scenario) {
            return Ok(artifact);
        }

        let artifact = self.store.load(scenario).await?.ok_or_else(|| {
            DomainError::model_missing(format!(
                "No model for {} at {}; upload data and train first",
                scenario,
                self.store.location(scenario)
            ))
        })?;

        // A concurrent load or swap may have won the race; keep theirs.
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let artifact = cache
            .entry(scenario)
            .or_insert_with(|| Arc::new(artifact))
            .clone();

        tracing::info!(scenario = %scenario, "Model loaded into registry");
        Ok(artifact)
    }

    /// Like [`get`](Self::get) for a scenario given by name
    pub async fn get_named(&self, scenario: &str) -> Result<Arc<ModelArtifact>, DomainError> {
        self.get(Scenario::from_str(scenario)?).await
    }

    /// Persist `artifact` and make it the current model for `scenario`
    pub async fn replace(
        &self,
        scenario: Scenario,
        artifact: ModelArtifact,
    ) -> Result<Arc<ModelArtifact>, DomainError> {
        let mut replaced = self.replace_all(vec![(scenario, artifact)]).await?;
        replaced
            .pop()
            .ok_or_else(|| DomainError::internal("replacement produced no artifact"))
    }

    /// Persist every artifact, then swap them all into the cache at once.
    ///
    /// If any save fails, the artifacts already written are rolled back to
    /// what was persisted before the call and nothing is swapped.
    pub async fn replace_all(
        &self,
        artifacts: Vec<(Scenario, ModelArtifact)>,
    ) -> Result<Vec<Arc<ModelArtifact>>, DomainError> {
        let _guard = self.writer.lock().await;

        for (scenario, artifact) in &artifacts {
            if artifact.scenario() != *scenario {
                return Err(DomainError::internal(format!(
                    "artifact for {} offered as {}",
                    artifact.scenario(),
                    scenario
                )));
            }
        }

        let mut previous = Vec::with_capacity(artifacts.len());
        for (scenario, _) in &artifacts {
            previous.push(self.persisted_snapshot(*scenario).await);
        }

        for (written, (scenario, artifact)) in artifacts.iter().enumerate() {
            if let Err(e) = self.store.save(*scenario, artifact).await {
                tracing::error!(
                    scenario = %scenario,
                    error = %e,
                    "Model save failed, rolling back"
                );
                self.roll_back(&artifacts[..written], &previous[..written])
                    .await;
                return Err(e);
            }
        }

        let swapped: Vec<(Scenario, Arc<ModelArtifact>)> = artifacts
            .into_iter()
            .map(|(scenario, artifact)| (scenario, Arc::new(artifact)))
            .collect();

        {
            let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            for (scenario, artifact) in &swapped {
                cache.insert(*scenario, artifact.clone());
            }
        }

        for (scenario, _) in &swapped {
            tracing::info!(scenario = %scenario, "Model replaced");
        }

        Ok(swapped.into_iter().map(|(_, artifact)| artifact).collect())
    }

    /// What a restarted process would load for `scenario`.
    ///
    /// The cache mirrors the store, so a cached artifact is used when present.
    /// An unreadable file counts as absent.
    async fn persisted_snapshot(&self, scenario: Scenario) -> Option<ModelArtifact> {
        if let Some(cached) = self.cached(scenario) {
            return Some(cached.as_ref().clone());
        }

        match self.store.load(scenario).await {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::warn!(scenario = %scenario, error = %e, "Unreadable model treated as absent");
                None
            }
        }
    }

    /// Restore the store entries of `written` to `previous`.
    ///
    /// A scenario whose restore fails is evicted from the cache, so the next
    /// read loads whatever the store holds.
    async fn roll_back(
        &self,
        written: &[(Scenario, ModelArtifact)],
        previous: &[Option<ModelArtifact>],
    ) {
        for ((scenario, _), old) in written.iter().zip(previous) {
            let restored = match old {
                Some(artifact) => self.store.save(*scenario, artifact).await,
                None => self.store.remove(*scenario).await,
            };

            if let Err(e) = restored {
                tracing::error!(scenario = %scenario, error = %e, "Model rollback failed");
                self.cache
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(scenario);
            }
        }
    }

    pub fn is_loaded(&self, scenario: Scenario) -> bool {
        self.cached(scenario).is_some()
    }

    pub async fn status(&self) -> Vec<ModelStatus> {
        let mut statuses = Vec::with_capacity(Scenario::ALL.len());

        for scenario in Scenario::ALL {
            let exists = match self.store.exists(scenario).await {
                Ok(exists) => exists,
                Err(e) => {
                    tracing::warn!(scenario = %scenario, error = %e, "Failed to stat model");
                    false
                }
            };

            statuses.push(ModelStatus {
                scenario,
                path: self.store.location(scenario),
                exists,
                loaded: self.is_loaded(scenario),
            });
        }

        statuses
    }
}
