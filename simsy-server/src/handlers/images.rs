use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
};
use serde_json::{Value, json};
use simsy_core::api::types::ApiResponse;
use simsy_model::ImageSlot;
use tracing::info;

use crate::infra::app_state::AppState;
use crate::infra::errors::{AppError, AppResult};
use crate::media::ImageStoreError;

impl From<ImageStoreError> for AppError {
    fn from(err: ImageStoreError) -> Self {
        match err {
            ImageStoreError::UnsupportedType(_) | ImageStoreError::Mismatch { .. } => {
                Self::unsupported_media_type(err.to_string())
            }
            ImageStoreError::Empty => Self::bad_request(err.to_string()),
            ImageStoreError::TooLarge => Self::new(StatusCode::PAYLOAD_TOO_LARGE, err.to_string()),
            ImageStoreError::Io(io) => {
                tracing::error!(error = %io, "image write failed");
                Self::internal("Failed to store image")
            }
        }
    }
}

/// Replace the image in `{collection}/{slot}` for entity `{id}` with the raw
/// request body.
pub async fn upload_image(
    State(state): State<AppState>,
    Path((collection, slot, id)): Path<(String, String, i64)>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ApiResponse<Value>>> {
    let slot = ImageSlot::parse(&collection, &slot)
        .ok_or_else(|| AppError::not_found(format!("No image slot {collection}/{slot}")))?;
    if !state.catalog.image_owner_exists(slot, id).await? {
        return Err(AppError::not_found(format!(
            "No {} with id {id}",
            slot.collection()
        )));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let path = state.images.save(slot, id, content_type, &body).await?;
    state.catalog.set_image(slot, id, Some(&path)).await?;
    info!(collection = slot.collection(), slot = slot.slot(), id, %path, "image uploaded");

    Ok(Json(
        ApiResponse::success(json!({ "path": path })).with_message("Image uploaded"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        assert_eq!(
            AppError::from(ImageStoreError::UnsupportedType("text/plain".into())).status,
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::from(ImageStoreError::TooLarge).status,
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::from(ImageStoreError::Empty).status,
            StatusCode::BAD_REQUEST
        );
    }
}
