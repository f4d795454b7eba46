//! Catalog entry ("pomůcka") model, DTOs and search result shapes.

use pomucky_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Descriptive metadata of a catalog entry, nested under `details` on the
/// wire and flattened into the row in storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomuckaDetails {
    pub author: Option<String>,
    pub year: Option<i32>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub misto_vydani: Option<String>,
    pub disadv_type: Option<String>,
    pub disadv_degree: Option<String>,
    pub disadv_tool: Option<String>,
}

/// A catalog entry row, with the ids of its images gathered by subquery.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pomucka {
    pub id: DbId,
    pub name: String,
    pub signatura: String,
    #[serde(rename = "ISXN")]
    pub isxn: Option<i64>,
    pub categories: Vec<String>,
    #[sqlx(flatten)]
    pub details: PomuckaDetails,
    pub images: Vec<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a catalog entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePomucka {
    pub name: String,
    pub signatura: String,
    pub isxn: Option<i64>,
    pub categories: Vec<String>,
    pub details: PomuckaDetails,
}

/// Partial update of the details block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePomuckaDetails {
    pub author: Option<String>,
    pub year: Option<i32>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub misto_vydani: Option<String>,
    pub disadv_type: Option<String>,
    pub disadv_degree: Option<String>,
    pub disadv_tool: Option<String>,
}

/// DTO for updating a catalog entry. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePomucka {
    pub name: Option<String>,
    pub signatura: Option<String>,
    pub isxn: Option<i64>,
    pub categories: Option<Vec<String>>,
    pub details: UpdatePomuckaDetails,
}

/// Distinct values available for narrowing a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogFacets {
    pub authors: Vec<String>,
    pub years: Vec<i32>,
    pub companies: Vec<String>,
    pub places: Vec<String>,
    pub categories: Vec<String>,
}

/// One page of search results with the total match count and facets.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub items: Vec<Pomucka>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub facets: CatalogFacets,
}
