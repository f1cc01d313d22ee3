//! Experiment tracker clients

mod disabled;
mod mlflow;

use std::sync::Arc;
use std::time::Duration;

pub use disabled::DisabledTracker;
pub use mlflow::MlflowTracker;

use crate::config::TrackingConfig;
use crate::domain::{DomainError, TrackingSink};

/// Build the configured tracking sink
pub fn create_tracking_sink(
    config: &TrackingConfig,
) -> Result<Arc<dyn TrackingSink>, DomainError> {
    if !config.enabled || config.uri.trim().is_empty() {
        tracing::info!("Experiment tracking disabled");
        return Ok(Arc::new(DisabledTracker));
    }

    let tracker = MlflowTracker::new(&config.uri, Duration::from_secs(config.timeout_secs))?;
    tracing::info!(uri = %config.uri, "Experiment tracking enabled");
    Ok(Arc::new(tracker))
}
