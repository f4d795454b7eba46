//! Repository for the `images` table.

use pomucky_core::types::DbId;
use sqlx::PgPool;

use crate::models::image::{CreateImage, ImageBlob, ImageMeta};

const META_COLUMNS: &str = "id, pomucka_id, alt, mimetype, created_at";

/// Stores catalog images. Rows go away with their catalog entry.
pub struct ImageRepo;

impl ImageRepo {
    /// Insert an image, returning its metadata.
    pub async fn create(pool: &PgPool, input: &CreateImage) -> Result<ImageMeta, sqlx::Error> {
        let query = format!(
            "INSERT INTO images (pomucka_id, alt, mimetype, data)
             VALUES ($1, $2, $3, $4)
             RETURNING {META_COLUMNS}"
        );
        sqlx::query_as::<_, ImageMeta>(&query)
            .bind(input.pomucka_id)
            .bind(&input.alt)
            .bind(&input.mimetype)
            .bind(&input.data)
            .fetch_one(pool)
            .await
    }

    pub async fn find_blob(pool: &PgPool, id: DbId) -> Result<Option<ImageBlob>, sqlx::Error> {
        sqlx::query_as::<_, ImageBlob>("SELECT mimetype, data FROM images WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Metadata of every image attached to a catalog entry, oldest first.
    pub async fn list_for_pomucka(
        pool: &PgPool,
        pomucka_id: DbId,
    ) -> Result<Vec<ImageMeta>, sqlx::Error> {
        let query =
            format!("SELECT {META_COLUMNS} FROM images WHERE pomucka_id = $1 ORDER BY id");
        sqlx::query_as::<_, ImageMeta>(&query)
            .bind(pomucka_id)
            .fetch_all(pool)
            .await
    }

    /// Delete an image. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
