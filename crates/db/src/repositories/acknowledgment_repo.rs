//! Repository for the `content_acknowledgments` table.
//!
//! Acknowledgments are immutable: there is no update, and a second insert
//! for the same (driver, content) fails on
//! `uq_content_acknowledgments_driver_content`.

use fleetcheck_core::types::DbId;
use sqlx::PgPool;

use crate::models::content::{Acknowledgment, AcknowledgmentReportRow, CreateAcknowledgment};

const COLUMNS: &str = "id, driver_id, content_id, answer, is_correct, read_time_secs, \
                       signature_path, acknowledged_at";

pub struct AcknowledgmentRepo;

impl AcknowledgmentRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateAcknowledgment,
    ) -> Result<Acknowledgment, sqlx::Error> {
        let query = format!(
            "INSERT INTO content_acknowledgments
                (driver_id, content_id, answer, is_correct, read_time_secs, signature_path)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Acknowledgment>(&query)
            .bind(input.driver_id)
            .bind(input.content_id)
            .bind(&input.answer)
            .bind(input.is_correct)
            .bind(input.read_time_secs)
            .bind(&input.signature_path)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        driver_id: DbId,
        content_id: DbId,
    ) -> Result<Option<Acknowledgment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_acknowledgments
             WHERE driver_id = $1 AND content_id = $2"
        );
        sqlx::query_as::<_, Acknowledgment>(&query)
            .bind(driver_id)
            .bind(content_id)
            .fetch_optional(pool)
            .await
    }

    /// Everyone who acknowledged a content item, optionally limited to a unit.
    pub async fn report_for_content(
        pool: &PgPool,
        content_id: DbId,
        unit: Option<&str>,
    ) -> Result<Vec<AcknowledgmentReportRow>, sqlx::Error> {
        sqlx::query_as::<_, AcknowledgmentReportRow>(
            "SELECT a.id AS acknowledgment_id, d.id AS driver_id, d.name AS driver_name,
                    d.cpf AS driver_cpf, d.unit AS driver_unit, a.answer, a.is_correct,
                    a.read_time_secs, a.signature_path, a.acknowledged_at
             FROM content_acknowledgments a
             JOIN drivers d ON d.id = a.driver_id
             WHERE a.content_id = $1
               AND ($2::TEXT IS NULL OR d.unit = $2)
             ORDER BY a.acknowledged_at, a.id",
        )
        .bind(content_id)
        .bind(unit)
        .fetch_all(pool)
        .await
    }
}
