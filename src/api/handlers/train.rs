//! Retraining endpoint

use axum::extract::State;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::infrastructure::services::TrainingReport;

/// POST /train
pub async fn train(State(state): State<AppState>) -> Result<Json<TrainingReport>, ApiError> {
    info!("Retraining requested");

    let report = state.training.train().await?;

    Ok(Json(report))
}
