//! Training data upload

use axum::extract::{multipart::MultipartError, Multipart, State};
use bytes::Bytes;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiErrorType, Json};
use crate::infrastructure::services::UploadSummary;

/// Body limit of the upload route (50 MB)
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const FILE_FIELD: &str = "file";

/// POST /upload-data, multipart field `file`
pub async fn upload_data(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadSummary>, ApiError> {
    let (filename, content) = read_file_field(&mut multipart).await?;

    debug!(filename = %filename, bytes = content.len(), "Received training data");

    let summary = state.datasets.upload(&filename, &content).await?;

    Ok(Json(summary))
}

async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field.bytes().await.map_err(multipart_error)?;

        return Ok((filename, content));
    }

    Err(ApiError::bad_request("Missing multipart field 'file'")
        .with_param(FILE_FIELD)
        .with_code("missing_file"))
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::new(err.status(), ApiErrorType::InvalidRequestError, err.body_text())
        .with_code("invalid_multipart")
}
