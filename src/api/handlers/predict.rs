//! Prediction endpoint

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, PredictFailureResponse, PredictRequest, PredictResponse};

/// POST /predict
///
/// A prediction whose audit record could not be written is still returned,
/// inside a 500 body next to the error.
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Response, ApiError> {
    debug!(
        keys = request.payload.len(),
        session_id = ?request.session_id,
        "Scoring prediction request"
    );

    let outcome = state
        .inference
        .predict(request.payload, request.session_id)
        .await?;
    let body = PredictResponse::from(&outcome.prediction);

    match outcome.audit {
        Ok(record) => {
            debug!(inference_id = record.id, "Prediction audited");
            Ok((StatusCode::OK, Json(body)).into_response())
        }
        Err(e) => {
            let error = ApiError::from(e);
            let status = error.status;
            Ok((status, Json(PredictFailureResponse::new(error, body))).into_response())
        }
    }
}
