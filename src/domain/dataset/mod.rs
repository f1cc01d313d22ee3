//! Dataset domain - Tabular training data and its canonical storage

mod entity;
mod repository;

pub use entity::{Column, ColumnData, OutcomeDistribution, TrainingDataset};
pub use repository::DatasetRepository;

#[cfg(test)]
pub use repository::mock;
