//! Catalog image model and DTOs.

use pomucky_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Image metadata without the payload.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMeta {
    pub id: DbId,
    pub pomucka_id: DbId,
    pub alt: String,
    pub mimetype: String,
    pub created_at: Timestamp,
}

/// Image payload as served to clients.
#[derive(Debug, Clone, FromRow)]
pub struct ImageBlob {
    pub mimetype: String,
    pub data: Vec<u8>,
}

/// DTO for storing a new image.
#[derive(Debug, Clone)]
pub struct CreateImage {
    pub pomucka_id: DbId,
    pub alt: String,
    pub mimetype: String,
    pub data: Vec<u8>,
}
