//! Audit log listing

use axum::extract::{Query, State};

use crate::api::state::AppState;
use crate::api::types::{ApiError, InferenceItem, InferencesQuery, InferencesResponse, Json};

/// GET /inferences?limit=N
pub async fn list_inferences(
    State(state): State<AppState>,
    Query(query): Query<InferencesQuery>,
) -> Result<Json<InferencesResponse>, ApiError> {
    let records = state.inference.recent(query.effective_limit()).await?;

    Ok(Json(InferencesResponse {
        inferences: records.into_iter().map(InferenceItem::from).collect(),
    }))
}
