//! Aggregate counters.

use serde::Serialize;
use sqlx::FromRow;

/// Network-wide totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub pomucky: i64,
    pub instances: i64,
    pub places: i64,
    pub on_loan: i64,
}

/// Totals from one place's point of view.
///
/// - `owned`: instances the place owns, wherever they are
/// - `hosted`: instances currently held there, whoever owns them
/// - `on_loan`: hosted instances lent to an outside party
/// - `lent_out`: owned instances held by another place
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceStats {
    pub owned: i64,
    pub hosted: i64,
    pub on_loan: i64,
    pub lent_out: i64,
}
