//! Repository for the `fixed_documents` table.

use fleetcheck_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::{CreateDocument, FixedDocument, UpdateDocument};

const COLUMNS: &str = "id, title, description, category, file_path, unit, created_at, updated_at";

pub struct DocumentRepo;

impl DocumentRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateDocument,
    ) -> Result<FixedDocument, sqlx::Error> {
        let query = format!(
            "INSERT INTO fixed_documents (title, description, category, file_path, unit)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FixedDocument>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.file_path)
            .bind(&input.unit)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FixedDocument>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fixed_documents WHERE id = $1");
        sqlx::query_as::<_, FixedDocument>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Documents visible in `unit`: the unit's own plus those published to all.
    ///
    /// `None` lists every document.
    pub async fn list(
        pool: &PgPool,
        unit: Option<&str>,
    ) -> Result<Vec<FixedDocument>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fixed_documents
             WHERE ($1::TEXT IS NULL OR unit IS NULL OR unit = $1)
             ORDER BY category NULLS LAST, title"
        );
        sqlx::query_as::<_, FixedDocument>(&query)
            .bind(unit)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDocument,
    ) -> Result<Option<FixedDocument>, sqlx::Error> {
        let query = format!(
            "UPDATE fixed_documents SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FixedDocument>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .fetch_optional(pool)
            .await
    }

    /// Delete a document row, returning its stored file path.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("DELETE FROM fixed_documents WHERE id = $1 RETURNING file_path")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
