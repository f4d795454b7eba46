//! Repository for the `places` table.

use pomucky_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::place::{CreatePlace, Place, PlaceBanner, UpdatePlace};

/// Column list shared across queries. The banner itself is never selected
/// here.
const COLUMNS: &str = "id, name, description, website, contacts, \
                       banner IS NOT NULL AS has_banner, created_at, updated_at";

/// Provides CRUD operations for places.
pub struct PlaceRepo;

impl PlaceRepo {
    /// Insert a new place, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePlace) -> Result<Place, sqlx::Error> {
        let query = format!(
            "INSERT INTO places (name, description, website, contacts)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Place>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.website)
            .bind(Json(&input.contacts))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Place>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM places WHERE id = $1");
        sqlx::query_as::<_, Place>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM places WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List all places ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<Place>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM places ORDER BY id");
        sqlx::query_as::<_, Place>(&query).fetch_all(pool).await
    }

    /// Fetch every place whose id is in `ids`. Unknown ids are skipped.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Place>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM places WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Place>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Update a place. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePlace,
    ) -> Result<Option<Place>, sqlx::Error> {
        let query = format!(
            "UPDATE places SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                website = COALESCE($4, website),
                contacts = COALESCE($5, contacts)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Place>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.website)
            .bind(input.contacts.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Fetch the banner of a place. `None` if the place does not exist or
    /// has no banner.
    pub async fn find_banner(pool: &PgPool, id: DbId) -> Result<Option<PlaceBanner>, sqlx::Error> {
        sqlx::query_as::<_, PlaceBanner>(
            "SELECT banner, banner_mimetype FROM places
             WHERE id = $1 AND banner IS NOT NULL",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Replace the banner of a place. Returns `true` if the row was updated.
    pub async fn set_banner(
        pool: &PgPool,
        id: DbId,
        data: &[u8],
        mimetype: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE places SET banner = $2, banner_mimetype = $3 WHERE id = $1")
                .bind(id)
                .bind(data)
                .bind(mimetype)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
