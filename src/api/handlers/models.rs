//! Model metadata endpoint

use axum::extract::{Path, State};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ModelInfo};

/// GET /models/{scenario}
pub async fn get_model(
    State(state): State<AppState>,
    Path(scenario): Path<String>,
) -> Result<Json<ModelInfo>, ApiError> {
    debug!(scenario = %scenario, "Getting model");

    let artifact = state.registry.get_named(&scenario).await?;

    Ok(Json(ModelInfo::from(&*artifact)))
}
