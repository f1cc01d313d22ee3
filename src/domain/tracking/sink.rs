//! Tracking sink trait

use async_trait::async_trait;

use super::TrackingRun;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// External experiment tracker receiving one bundle per scenario per training run
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TrackingSink: Send + Sync {
    /// Log a complete run, returning the tracker's run id
    async fn log_run(&self, run: &TrackingRun) -> Result<String, DomainError>;

    /// Tracker address, `None` when tracking is disabled
    fn uri(&self) -> Option<String>;
}
