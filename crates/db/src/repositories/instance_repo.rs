//! Repository for the `instances` table.
//!
//! There is no delete: instance rows are the lending history.

use pomucky_core::instance::LoanChange;
use pomucky_core::types::DbId;
use sqlx::PgPool;

use crate::models::instance::{CreateInstance, InstanceRow, UpdateInstance};

const COLUMNS: &str = "id, pomucka_id, owned_by, currently_at, rented_by_name, \
                       rented_by_identifier, created_at, updated_at";

pub struct InstanceRepo;

impl InstanceRepo {
    /// Register a new instance owned by and located at `input.place_id`,
    /// not on loan.
    pub async fn create(
        pool: &PgPool,
        input: &CreateInstance,
    ) -> Result<InstanceRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO instances (pomucka_id, owned_by, currently_at)
             VALUES ($1, $2, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InstanceRow>(&query)
            .bind(input.pomucka_id)
            .bind(input.place_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<InstanceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM instances WHERE id = $1");
        sqlx::query_as::<_, InstanceRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<InstanceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM instances ORDER BY id");
        sqlx::query_as::<_, InstanceRow>(&query).fetch_all(pool).await
    }

    /// Instances physically held at `place_id`.
    pub async fn list_at(pool: &PgPool, place_id: DbId) -> Result<Vec<InstanceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM instances WHERE currently_at = $1 ORDER BY id");
        sqlx::query_as::<_, InstanceRow>(&query)
            .bind(place_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_pomucka(
        pool: &PgPool,
        pomucka_id: DbId,
    ) -> Result<Vec<InstanceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM instances WHERE pomucka_id = $1 ORDER BY id");
        sqlx::query_as::<_, InstanceRow>(&query)
            .bind(pomucka_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a relocation and loan change in a single statement. Concurrent
    /// writers to the same row resolve as last write wins.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateInstance,
    ) -> Result<Option<InstanceRow>, sqlx::Error> {
        let (touch_loan, name, identifier) = match &input.loan {
            LoanChange::Keep => (false, None, None),
            LoanChange::Clear => (true, None, None),
            LoanChange::Assign(renter) => (
                true,
                Some(renter.name.as_str()),
                Some(renter.identifier.as_str()),
            ),
        };

        let query = format!(
            "UPDATE instances SET
                currently_at = COALESCE($2, currently_at),
                rented_by_name = CASE WHEN $3 THEN $4 ELSE rented_by_name END,
                rented_by_identifier = CASE WHEN $3 THEN $5 ELSE rented_by_identifier END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InstanceRow>(&query)
            .bind(id)
            .bind(input.currently_at)
            .bind(touch_loan)
            .bind(name)
            .bind(identifier)
            .fetch_optional(pool)
            .await
    }
}
