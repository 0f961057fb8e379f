//! Repository for the `checklists` table.

use fleetcheck_core::types::DbId;
use sqlx::PgPool;

use crate::models::checklist::{Checklist, CreateChecklist, UpdateChecklist};

const COLUMNS: &str = "id, name, code, version, kind, unit, is_active, created_at, updated_at";

/// Provides CRUD operations for checklist templates.
pub struct ChecklistRepo;

impl ChecklistRepo {
    /// Insert a checklist. A missing version defaults to 1.
    pub async fn create(pool: &PgPool, input: &CreateChecklist) -> Result<Checklist, sqlx::Error> {
        let query = format!(
            "INSERT INTO checklists (name, code, version, kind, unit)
             VALUES ($1, $2, COALESCE($3, 1), $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Checklist>(&query)
            .bind(&input.name)
            .bind(&input.code)
            .bind(input.version)
            .bind(&input.kind)
            .bind(&input.unit)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Checklist>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM checklists WHERE id = $1");
        sqlx::query_as::<_, Checklist>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List checklists. `active_only` hides deactivated templates.
    pub async fn list(
        pool: &PgPool,
        unit: Option<&str>,
        active_only: bool,
    ) -> Result<Vec<Checklist>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM checklists
             WHERE ($1::TEXT IS NULL OR unit = $1)
               AND (NOT $2 OR is_active)
             ORDER BY name, version DESC"
        );
        sqlx::query_as::<_, Checklist>(&query)
            .bind(unit)
            .bind(active_only)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateChecklist,
    ) -> Result<Option<Checklist>, sqlx::Error> {
        let query = format!(
            "UPDATE checklists SET
                name = COALESCE($2, name),
                kind = COALESCE($3, kind),
                is_active = COALESCE($4, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Checklist>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.kind)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a checklist and its items. Fails once it has submissions.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM checklists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
