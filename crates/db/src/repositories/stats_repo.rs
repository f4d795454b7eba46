//! Aggregate counts over places, catalog and instances.

use pomucky_core::types::DbId;
use sqlx::PgPool;

use crate::models::stats::{CatalogStats, PlaceStats};

pub struct StatsRepo;

impl StatsRepo {
    pub async fn catalog(pool: &PgPool) -> Result<CatalogStats, sqlx::Error> {
        sqlx::query_as::<_, CatalogStats>(
            "SELECT
                (SELECT COUNT(*) FROM pomucky) AS pomucky,
                (SELECT COUNT(*) FROM instances) AS instances,
                (SELECT COUNT(*) FROM places) AS places,
                (SELECT COUNT(*) FROM instances WHERE rented_by_name IS NOT NULL) AS on_loan",
        )
        .fetch_one(pool)
        .await
    }

    pub async fn for_place(pool: &PgPool, place_id: DbId) -> Result<PlaceStats, sqlx::Error> {
        sqlx::query_as::<_, PlaceStats>(
            "SELECT
                COUNT(*) FILTER (WHERE owned_by = $1) AS owned,
                COUNT(*) FILTER (WHERE currently_at = $1) AS hosted,
                COUNT(*) FILTER (
                    WHERE currently_at = $1 AND rented_by_name IS NOT NULL
                ) AS on_loan,
                COUNT(*) FILTER (WHERE owned_by = $1 AND currently_at <> $1) AS lent_out
             FROM instances",
        )
        .bind(place_id)
        .fetch_one(pool)
        .await
    }
}
