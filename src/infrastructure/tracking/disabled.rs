use async_trait::async_trait;

use crate::domain::{DomainError, TrackingRun, TrackingSink};

/// Sink used when no tracker is configured; every run is reported untracked
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTracker;

#[async_trait]
impl TrackingSink for DisabledTracker {
    async fn log_run(&self, _run: &TrackingRun) -> Result<String, DomainError> {
        Err(DomainError::tracking("tracking disabled"))
    }

    fn uri(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_tracker_never_tracks() {
        let run = TrackingRun::new("student-success-S2", "S2_20240101_000000");
        let err = DisabledTracker.log_run(&run).await.unwrap_err();

        assert!(matches!(err, DomainError::Tracking { .. }));
        assert!(DisabledTracker.uri().is_none());
    }
}
