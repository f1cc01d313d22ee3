//! File-backed storage for model artifacts and the canonical dataset

mod csv_dataset;
mod fs;
mod model_store;

pub use csv_dataset::{parse_csv, write_csv, CsvDatasetRepository};
pub use fs::write_atomic;
pub use model_store::FileModelStore;
