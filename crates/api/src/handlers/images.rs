//! Handlers for catalog images.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use pomucky_core::error::CoreError;
use pomucky_core::media::image_mimetype;
use pomucky_core::types::DbId;
use pomucky_core::validation::{FieldError, ERR_REQUIRED};
use pomucky_db::models::image::{CreateImage, ImageMeta};
use pomucky_db::repositories::{ImageRepo, PomuckaRepo};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{ApiQuery, PathId};
use crate::middleware::rbac::RequireGlobalAdmin;
use crate::state::AppState;

/// Query parameters for `POST /pomucky/{id}/images`.
#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    /// Alternative text for screen readers.
    #[serde(default)]
    pub alt: String,
}

async fn ensure_pomucka(state: &AppState, id: DbId) -> AppResult<()> {
    if PomuckaRepo::exists(&state.pool, id).await? {
        Ok(())
    } else {
        Err(CoreError::NotFound {
            entity: "pomucka",
            id,
        }
        .into())
    }
}

/// POST /pomucky/{id}/images
///
/// The body is the raw image; its format comes from `Content-Type`.
pub async fn upload_image(
    State(state): State<AppState>,
    RequireGlobalAdmin(auth): RequireGlobalAdmin,
    PathId(pomucka_id): PathId,
    ApiQuery(params): ApiQuery<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ImageMeta>> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let mimetype = image_mimetype(content_type).map_err(CoreError::from)?;
    if body.is_empty() {
        return Err(CoreError::from(FieldError::new("body", ERR_REQUIRED)).into());
    }
    ensure_pomucka(&state, pomucka_id).await?;

    let create = CreateImage {
        pomucka_id,
        alt: params.alt,
        mimetype: mimetype.to_string(),
        data: body.to_vec(),
    };
    let image = ImageRepo::create(&state.pool, &create).await?;

    tracing::info!(
        image_id = image.id,
        pomucka_id,
        mimetype,
        bytes = create.data.len(),
        created_by = auth.caller.user_id,
        "Image stored"
    );
    Ok(Json(image))
}

/// GET /pomucky/{id}/images
pub async fn list_images(
    State(state): State<AppState>,
    PathId(pomucka_id): PathId,
) -> AppResult<Json<Vec<ImageMeta>>> {
    ensure_pomucka(&state, pomucka_id).await?;
    Ok(Json(ImageRepo::list_for_pomucka(&state.pool, pomucka_id).await?))
}

/// GET /images/{id}
pub async fn get_image(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<impl IntoResponse> {
    let image = ImageRepo::find_blob(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "image", id })?;
    Ok(([(CONTENT_TYPE, image.mimetype)], image.data))
}

/// DELETE /images/{id}
pub async fn delete_image(
    State(state): State<AppState>,
    RequireGlobalAdmin(auth): RequireGlobalAdmin,
    PathId(id): PathId,
) -> AppResult<StatusCode> {
    if !ImageRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound { entity: "image", id }.into());
    }
    tracing::info!(image_id = id, deleted_by = auth.caller.user_id, "Image deleted");
    Ok(StatusCode::NO_CONTENT)
}
