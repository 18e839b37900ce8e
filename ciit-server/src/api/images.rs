//! Concept image upload endpoint

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use ciit_common::model::Concept;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Response for a stored image upload. `image` is the stored filename the
/// concept now references.
#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub success: bool,
    pub image: String,
    pub concept: Concept,
}

/// POST /api/concepts/:id/image
///
/// Accepts a multipart form with an `image` field, stores the file under the
/// images folder as `<conceptId>.<ext>`, and points the concept at it. Type
/// and size limits are enforced by the catalog store.
pub async fn upload_concept_image(
    State(state): State<AppState>,
    Path(concept_id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadImageResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let mime_type = field
            .content_type()
            .ok_or_else(|| ApiError::BadRequest("Image field has no content type".to_string()))?
            .to_string();
        // file_name borrows the field, so copy it out before consuming bytes.
        let original_filename = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read image data: {e}")))?;

        let (image, concept) = state
            .catalog
            .set_concept_image(
                &concept_id,
                &data,
                &mime_type,
                original_filename.as_deref(),
            )
            .await?;

        return Ok(Json(UploadImageResponse {
            success: true,
            image,
            concept,
        }));
    }

    Err(ApiError::BadRequest(
        "No image field in upload".to_string(),
    ))
}
