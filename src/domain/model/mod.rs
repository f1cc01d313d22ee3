//! Model domain - Trained artifacts, predictions, and artifact storage

mod entity;
mod store;

pub use entity::{label_for, ModelArtifact, Prediction, DECISION_THRESHOLD};
pub use store::ModelStore;

#[cfg(test)]
pub use store::mock;
