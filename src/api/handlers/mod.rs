//! HTTP endpoint handlers

pub mod inferences;
pub mod models;
pub mod predict;
pub mod train;
pub mod upload;

pub use inferences::list_inferences;
pub use models::get_model;
pub use predict::predict;
pub use train::train;
pub use upload::{upload_data, MAX_UPLOAD_BYTES};
