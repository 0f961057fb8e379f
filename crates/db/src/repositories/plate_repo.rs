//! Repository for the `plates` table.

use fleetcheck_core::types::DbId;
use sqlx::PgPool;

use crate::models::plate::{CreatePlate, Plate, UpdatePlate};

const COLUMNS: &str = "id, plate, kind, unit, created_at, updated_at";

/// Provides CRUD operations for plates.
pub struct PlateRepo;

impl PlateRepo {
    pub async fn create(pool: &PgPool, input: &CreatePlate) -> Result<Plate, sqlx::Error> {
        let query = format!(
            "INSERT INTO plates (plate, kind, unit) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plate>(&query)
            .bind(&input.plate)
            .bind(&input.kind)
            .bind(&input.unit)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Plate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM plates WHERE id = $1");
        sqlx::query_as::<_, Plate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look up a plate by its normalized identifier.
    pub async fn find_by_plate(pool: &PgPool, plate: &str) -> Result<Option<Plate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM plates WHERE plate = $1");
        sqlx::query_as::<_, Plate>(&query)
            .bind(plate)
            .fetch_optional(pool)
            .await
    }

    /// List plates, optionally restricted to a unit and kind.
    pub async fn list(
        pool: &PgPool,
        unit: Option<&str>,
        kind: Option<&str>,
    ) -> Result<Vec<Plate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM plates
             WHERE ($1::TEXT IS NULL OR unit = $1)
               AND ($2::TEXT IS NULL OR kind = $2)
             ORDER BY plate"
        );
        sqlx::query_as::<_, Plate>(&query)
            .bind(unit)
            .bind(kind)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePlate,
    ) -> Result<Option<Plate>, sqlx::Error> {
        let query = format!(
            "UPDATE plates SET
                kind = COALESCE($2, kind),
                unit = COALESCE($3, unit)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plate>(&query)
            .bind(id)
            .bind(&input.kind)
            .bind(&input.unit)
            .fetch_optional(pool)
            .await
    }

    /// Whether any vehicle set uses this plate in any slot.
    pub async fn is_in_use(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM vehicles
                WHERE tractor_plate_id = $1 OR trailer1_plate_id = $1 OR trailer2_plate_id = $1
             )",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Delete a plate. Fails with a foreign-key violation while a vehicle uses it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM plates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert many plates in one transaction.
    pub async fn create_many(pool: &PgPool, rows: &[CreatePlate]) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        for input in rows {
            sqlx::query("INSERT INTO plates (plate, kind, unit) VALUES ($1, $2, $3)")
                .bind(&input.plate)
                .bind(&input.kind)
                .bind(&input.unit)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(rows.len() as u64)
    }
}
