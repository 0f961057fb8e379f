//! Repository for the `checklist_items` table.

use fleetcheck_core::types::DbId;
use sqlx::PgPool;

use crate::models::checklist::{ChecklistItem, CreateChecklistItem, UpdateChecklistItem};

const COLUMNS: &str = "id, checklist_id, parent_id, text, sort_order, created_at, updated_at";

pub struct ChecklistItemRepo;

impl ChecklistItemRepo {
    /// Insert an item. Without an explicit sort order it goes after its siblings.
    pub async fn create(
        pool: &PgPool,
        checklist_id: DbId,
        input: &CreateChecklistItem,
    ) -> Result<ChecklistItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO checklist_items (checklist_id, parent_id, text, sort_order)
             VALUES ($1, $2, $3, COALESCE($4, (
                SELECT COALESCE(MAX(sort_order), 0) + 1 FROM checklist_items
                WHERE checklist_id = $1 AND parent_id IS NOT DISTINCT FROM $2
             )))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChecklistItem>(&query)
            .bind(checklist_id)
            .bind(input.parent_id)
            .bind(&input.text)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ChecklistItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM checklist_items WHERE id = $1");
        sqlx::query_as::<_, ChecklistItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every item of a checklist, flat, in `(sort_order, id)` order.
    pub async fn list_by_checklist(
        pool: &PgPool,
        checklist_id: DbId,
    ) -> Result<Vec<ChecklistItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM checklist_items
             WHERE checklist_id = $1
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, ChecklistItem>(&query)
            .bind(checklist_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateChecklistItem,
    ) -> Result<Option<ChecklistItem>, sqlx::Error> {
        let query = format!(
            "UPDATE checklist_items SET
                text = COALESCE($2, text),
                sort_order = COALESCE($3, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChecklistItem>(&query)
            .bind(id)
            .bind(&input.text)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Delete an item and its sub-items. Fails once any of them was answered.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM checklist_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
