//! Image classification endpoint

use agrisathi_core::Classification;
use axum::Json;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use tracing::info;

use crate::error::ApiError;
use crate::state::SharedState;

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// POST /predict - classify one uploaded image
pub async fn predict(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Classification>, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::Upload(e.body_text()))?;
    let bytes = read_file_field(multipart).await?;

    let classifier = state.classifier.get().await?;
    let size = bytes.len();
    let result = tokio::task::spawn_blocking(move || classifier.classify_bytes(&bytes)).await??;

    info!(
        bytes = size,
        label = %result.label,
        confidence = result.confidence,
        "classified upload"
    );
    Ok(Json(result))
}

/// Bytes of the first non-empty `file` field.
async fn read_file_field(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(e.body_text()))?
    {
        if field.name() == Some(FILE_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Upload(e.body_text()))?;
            if !data.is_empty() {
                return Ok(data.to_vec());
            }
        }
    }
    Err(ApiError::MissingFile)
}
