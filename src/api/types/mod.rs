//! HTTP request and response types

pub mod error;
pub mod json;
pub mod model;
pub mod prediction;

pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use model::ModelInfo;
pub use prediction::{
    InferenceItem, InferencesQuery, InferencesResponse, PredictFailureResponse, PredictRequest,
    PredictResponse, DEFAULT_INFERENCE_LIMIT, MAX_INFERENCE_LIMIT,
};
