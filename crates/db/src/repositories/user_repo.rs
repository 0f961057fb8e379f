//! Repository for the `users` table.

use fleetcheck_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, full_name, cpf, sector, unit, role, password_hash, \
                       is_active, last_login_at, created_at, updated_at";

/// Provides CRUD operations for staff users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, full_name, cpf, sector, unit, role, password_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.full_name)
            .bind(&input.cpf)
            .bind(&input.sector)
            .bind(&input.unit)
            .bind(&input.role)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// List users, optionally restricted to a unit, ordered by username.
    pub async fn list(pool: &PgPool, unit: Option<&str>) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE ($1::TEXT IS NULL OR unit = $1)
             ORDER BY username"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(unit)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                full_name = COALESCE($2, full_name),
                cpf = COALESCE($3, cpf),
                sector = COALESCE($4, sector),
                unit = COALESCE($5, unit),
                role = COALESCE($6, role),
                is_active = COALESCE($7, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.cpf)
            .bind(&input.sector)
            .bind(&input.unit)
            .bind(&input.role)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
