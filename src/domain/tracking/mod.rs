//! Tracking domain - Best-effort export of training runs to an experiment tracker

mod run;
mod sink;

pub use run::{TrackingArtifact, TrackingOutcome, TrackingRun};
pub use sink::TrackingSink;

#[cfg(test)]
pub use sink::MockTrackingSink;
