//! Repository for the `vehicles` table (conjuntos).

use fleetcheck_core::types::DbId;
use sqlx::PgPool;

use crate::models::vehicle::{CreateVehicle, UpdateVehicle, Vehicle};

/// Select list joined with the plate identifiers of each slot.
const SELECT: &str = "SELECT v.id, v.name, \
                      v.tractor_plate_id, pt.plate AS tractor_plate, \
                      v.trailer1_plate_id, p1.plate AS trailer1_plate, \
                      v.trailer2_plate_id, p2.plate AS trailer2_plate, \
                      v.unit, v.operation, v.created_at, v.updated_at \
                      FROM vehicles v \
                      JOIN plates pt ON pt.id = v.tractor_plate_id \
                      LEFT JOIN plates p1 ON p1.id = v.trailer1_plate_id \
                      LEFT JOIN plates p2 ON p2.id = v.trailer2_plate_id";

/// Provides CRUD operations for vehicle sets.
pub struct VehicleRepo;

impl VehicleRepo {
    pub async fn create(pool: &PgPool, input: &CreateVehicle) -> Result<Vehicle, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO vehicles
                (name, tractor_plate_id, trailer1_plate_id, trailer2_plate_id, unit, operation)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(&input.name)
        .bind(input.tractor_plate_id)
        .bind(input.trailer1_plate_id)
        .bind(input.trailer2_plate_id)
        .bind(&input.unit)
        .bind(&input.operation)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Vehicle>, sqlx::Error> {
        let query = format!("{SELECT} WHERE v.id = $1");
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Vehicle>, sqlx::Error> {
        let query = format!("{SELECT} WHERE v.name = $1");
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, unit: Option<&str>) -> Result<Vec<Vehicle>, sqlx::Error> {
        let query = format!("{SELECT} WHERE ($1::TEXT IS NULL OR v.unit = $1) ORDER BY v.name");
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(unit)
            .fetch_all(pool)
            .await
    }

    /// Replace every column of a vehicle set.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVehicle,
    ) -> Result<Option<Vehicle>, sqlx::Error> {
        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE vehicles SET
                name = $2,
                tractor_plate_id = $3,
                trailer1_plate_id = $4,
                trailer2_plate_id = $5,
                unit = $6,
                operation = $7
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.tractor_plate_id)
        .bind(input.trailer1_plate_id)
        .bind(input.trailer2_plate_id)
        .bind(&input.unit)
        .bind(&input.operation)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(id) => Self::find_by_id(pool, id).await,
            None => Ok(None),
        }
    }

    /// Delete a vehicle set. Drivers assigned to it are unassigned.
    ///
    /// Fails with a foreign-key violation once checklists were submitted for it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert many vehicle sets in one transaction.
    pub async fn create_many(pool: &PgPool, rows: &[CreateVehicle]) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        for input in rows {
            sqlx::query(
                "INSERT INTO vehicles
                    (name, tractor_plate_id, trailer1_plate_id, trailer2_plate_id, unit, operation)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(&input.name)
            .bind(input.tractor_plate_id)
            .bind(input.trailer1_plate_id)
            .bind(input.trailer2_plate_id)
            .bind(&input.unit)
            .bind(&input.operation)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(rows.len() as u64)
    }
}
