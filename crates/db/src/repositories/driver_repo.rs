//! Repository for the `drivers` table.

use fleetcheck_core::types::DbId;
use sqlx::PgPool;

use crate::models::driver::{CreateDriver, Driver, UpdateDriver};

/// Select list joined with the assigned vehicle's name.
const SELECT: &str = "SELECT d.id, d.name, d.cpf, d.rg, d.cnh, d.unit, d.operation, d.vehicle_id, \
                      v.name AS vehicle_name, d.password_hash, d.is_active, d.last_login_at, \
                      d.created_at, d.updated_at \
                      FROM drivers d LEFT JOIN vehicles v ON v.id = d.vehicle_id";

/// Provides CRUD operations for drivers.
pub struct DriverRepo;

impl DriverRepo {
    /// Insert a new driver, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateDriver) -> Result<Driver, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO drivers (name, cpf, rg, cnh, unit, operation, vehicle_id, password_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.cpf)
        .bind(&input.rg)
        .bind(&input.cnh)
        .bind(&input.unit)
        .bind(&input.operation)
        .bind(input.vehicle_id)
        .bind(&input.password_hash)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Driver>, sqlx::Error> {
        let query = format!("{SELECT} WHERE d.id = $1");
        sqlx::query_as::<_, Driver>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_cpf(pool: &PgPool, cpf: &str) -> Result<Option<Driver>, sqlx::Error> {
        let query = format!("{SELECT} WHERE d.cpf = $1");
        sqlx::query_as::<_, Driver>(&query)
            .bind(cpf)
            .fetch_optional(pool)
            .await
    }

    /// Name of the first unique identifier (`CPF`, `RG`, `CNH`) already held
    /// by another driver, if any.
    pub async fn find_identity_clash(
        pool: &PgPool,
        cpf: &str,
        rg: &str,
        cnh: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT CASE WHEN cpf = $1 THEN 'CPF' WHEN rg = $2 THEN 'RG' ELSE 'CNH' END
             FROM drivers
             WHERE cpf = $1 OR rg = $2 OR cnh = $3
             LIMIT 1",
        )
        .bind(cpf)
        .bind(rg)
        .bind(cnh)
        .fetch_optional(pool)
        .await
    }

    /// Number of drivers assigned to `vehicle_id` whose unit is not `unit`.
    pub async fn count_assigned_outside_unit(
        pool: &PgPool,
        vehicle_id: DbId,
        unit: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM drivers WHERE vehicle_id = $1 AND unit <> $2")
            .bind(vehicle_id)
            .bind(unit)
            .fetch_one(pool)
            .await
    }

    /// Active drivers whose CPF starts with `prefix`, oldest first.
    ///
    /// Login tries each candidate in turn, so the order decides which driver
    /// wins when two CPFs share their first digits.
    pub async fn find_login_candidates(
        pool: &PgPool,
        prefix: &str,
    ) -> Result<Vec<Driver>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE LEFT(d.cpf, {len}) = $1 AND d.is_active = true ORDER BY d.id",
            len = prefix.len()
        );
        sqlx::query_as::<_, Driver>(&query)
            .bind(prefix)
            .fetch_all(pool)
            .await
    }

    /// List drivers, optionally restricted to a unit, ordered by name.
    pub async fn list(pool: &PgPool, unit: Option<&str>) -> Result<Vec<Driver>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE ($1::TEXT IS NULL OR d.unit = $1) ORDER BY d.name, d.id"
        );
        sqlx::query_as::<_, Driver>(&query)
            .bind(unit)
            .fetch_all(pool)
            .await
    }

    /// Update a driver. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDriver,
    ) -> Result<Option<Driver>, sqlx::Error> {
        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE drivers SET
                name = COALESCE($2, name),
                rg = COALESCE($3, rg),
                cnh = COALESCE($4, cnh),
                unit = COALESCE($5, unit),
                operation = COALESCE($6, operation),
                vehicle_id = CASE WHEN $7 THEN NULL ELSE COALESCE($8, vehicle_id) END,
                is_active = COALESCE($9, is_active)
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.rg)
        .bind(&input.cnh)
        .bind(&input.unit)
        .bind(&input.operation)
        .bind(input.clear_vehicle)
        .bind(input.vehicle_id)
        .bind(input.is_active)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(id) => Self::find_by_id(pool, id).await,
            None => Ok(None),
        }
    }

    /// Delete a driver. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE drivers SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Set or clear (`None`) a driver's password hash.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE drivers SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert many drivers in one transaction. Any failure rolls back the batch.
    pub async fn create_many(pool: &PgPool, rows: &[CreateDriver]) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        for input in rows {
            sqlx::query(
                "INSERT INTO drivers (name, cpf, rg, cnh, unit, operation)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(&input.name)
            .bind(&input.cpf)
            .bind(&input.rg)
            .bind(&input.cnh)
            .bind(&input.unit)
            .bind(&input.operation)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(rows.len() as u64)
    }
}
