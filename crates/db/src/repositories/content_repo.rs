//! Repository for the `contents` table.

use fleetcheck_core::types::DbId;
use sqlx::PgPool;

use crate::models::content::{Content, CreateContent, DriverContent, UpdateContent};

const COLUMNS: &str = "id, content_date, subject, question, answer_options, correct_answer, \
                       resource_kind, resource_link, created_at, updated_at";

/// Provides CRUD operations for training content.
pub struct ContentRepo;

impl ContentRepo {
    pub async fn create(pool: &PgPool, input: &CreateContent) -> Result<Content, sqlx::Error> {
        let query = format!(
            "INSERT INTO contents
                (content_date, subject, question, answer_options, correct_answer,
                 resource_kind, resource_link)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Content>(&query)
            .bind(input.content_date)
            .bind(&input.subject)
            .bind(&input.question)
            .bind(&input.answer_options)
            .bind(&input.correct_answer)
            .bind(&input.resource_kind)
            .bind(&input.resource_link)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Content>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contents WHERE id = $1");
        sqlx::query_as::<_, Content>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List content, newest date first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Content>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contents ORDER BY content_date DESC, id DESC");
        sqlx::query_as::<_, Content>(&query).fetch_all(pool).await
    }

    /// List content for a driver, each entry flagged when already acknowledged.
    pub async fn list_for_driver(
        pool: &PgPool,
        driver_id: DbId,
    ) -> Result<Vec<DriverContent>, sqlx::Error> {
        sqlx::query_as::<_, DriverContent>(
            "SELECT c.id, c.content_date, c.subject, c.resource_kind,
                    (a.id IS NOT NULL) AS acknowledged
             FROM contents c
             LEFT JOIN content_acknowledgments a
                ON a.content_id = c.id AND a.driver_id = $1
             ORDER BY c.content_date DESC, c.id DESC",
        )
        .bind(driver_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateContent,
    ) -> Result<Option<Content>, sqlx::Error> {
        let query = format!(
            "UPDATE contents SET
                content_date = COALESCE($2, content_date),
                subject = COALESCE($3, subject),
                question = COALESCE($4, question),
                answer_options = COALESCE($5, answer_options),
                correct_answer = COALESCE($6, correct_answer),
                resource_kind = COALESCE($7, resource_kind),
                resource_link = COALESCE($8, resource_link)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Content>(&query)
            .bind(id)
            .bind(input.content_date)
            .bind(&input.subject)
            .bind(&input.question)
            .bind(&input.answer_options)
            .bind(&input.correct_answer)
            .bind(&input.resource_kind)
            .bind(&input.resource_link)
            .fetch_optional(pool)
            .await
    }

    /// Delete content together with its acknowledgments.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contents WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
