//! Route definitions for catalog images.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use pomucky_core::media::MAX_IMAGE_BYTES;

use crate::handlers::images;
use crate::state::AppState;

/// ```text
/// GET    /pomucky/{id}/images   -> list_images
/// POST   /pomucky/{id}/images   -> upload_image
/// GET    /images/{id}           -> get_image
/// DELETE /images/{id}           -> delete_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/pomucky/{id}/images",
            get(images::list_images)
                .post(images::upload_image)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route(
            "/images/{id}",
            get(images::get_image).delete(images::delete_image),
        )
}
