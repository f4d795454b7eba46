//! Place entity model and DTOs.

use pomucky_core::place::Contact;
use pomucky_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A place row without the banner bytes.
///
/// `has_banner` is computed in the select list so listings never pull the
/// image data.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub website: String,
    pub contacts: Json<Vec<Contact>>,
    pub has_banner: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Banner image of a place.
#[derive(Debug, Clone, FromRow)]
pub struct PlaceBanner {
    pub banner: Vec<u8>,
    pub banner_mimetype: String,
}

/// DTO for creating a new place.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlace {
    pub name: String,
    pub description: String,
    pub website: String,
    pub contacts: Vec<Contact>,
}

/// DTO for updating a place. `contacts`, when present, replaces the whole
/// list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlace {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub contacts: Option<Vec<Contact>>,
}
