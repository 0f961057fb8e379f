//! Repository for checklist submissions and their item responses.

use fleetcheck_core::paging::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use fleetcheck_core::types::DbId;
use sqlx::PgPool;

use crate::models::submission::{
    CreateSubmission, ItemResponse, NewResponse, Submission, SubmissionFilter, SubmissionOutcome,
};

/// Select list joined with checklist, driver, and vehicle names.
const SELECT: &str = "SELECT s.id, s.checklist_id, c.name AS checklist_name, \
                      s.driver_id, d.name AS driver_name, \
                      s.vehicle_id, v.name AS vehicle_name, v.unit, \
                      s.submitted_at, s.observations, s.location, s.odometer_km, \
                      s.driver_signature_path, s.inspector_signature_path \
                      FROM checklist_submissions s \
                      JOIN checklists c ON c.id = s.checklist_id \
                      JOIN drivers d ON d.id = s.driver_id \
                      JOIN vehicles v ON v.id = s.vehicle_id";

pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Persist a submission, its responses, and the pendencies its
    /// non-conforming answers open, in a single transaction.
    ///
    /// A non-conforming item that already has an active pendency for the
    /// vehicle is recorded as a response only; the partial unique index
    /// `uq_pendencies_active_item_vehicle` makes the pendency insert a no-op.
    pub async fn create_with_responses(
        pool: &PgPool,
        input: &CreateSubmission,
        responses: &[NewResponse],
    ) -> Result<SubmissionOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let submission_id: DbId = sqlx::query_scalar(
            "INSERT INTO checklist_submissions
                (checklist_id, driver_id, vehicle_id, observations, location, odometer_km,
                 driver_signature_path, inspector_signature_path)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(input.checklist_id)
        .bind(input.driver_id)
        .bind(input.vehicle_id)
        .bind(&input.observations)
        .bind(&input.location)
        .bind(input.odometer_km)
        .bind(&input.driver_signature_path)
        .bind(&input.inspector_signature_path)
        .fetch_one(&mut *tx)
        .await?;

        let mut opened_pendency_ids = Vec::new();
        let mut already_pending_item_ids = Vec::new();

        for response in responses {
            let response_id: DbId = sqlx::query_scalar(
                "INSERT INTO checklist_item_responses (submission_id, item_id, conformity, note)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id",
            )
            .bind(submission_id)
            .bind(response.item_id)
            .bind(response.conformity.as_str())
            .bind(&response.note)
            .fetch_one(&mut *tx)
            .await?;

            if !response.conformity.opens_pendency() {
                continue;
            }

            let pendency_id: Option<DbId> = sqlx::query_scalar(
                "INSERT INTO pendencies (item_id, vehicle_id, submission_id, response_id)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (item_id, vehicle_id) WHERE status IN ('open', 'in_progress')
                 DO NOTHING
                 RETURNING id",
            )
            .bind(response.item_id)
            .bind(input.vehicle_id)
            .bind(submission_id)
            .bind(response_id)
            .fetch_optional(&mut *tx)
            .await?;

            match pendency_id {
                Some(id) => opened_pendency_ids.push(id),
                None => already_pending_item_ids.push(response.item_id),
            }
        }

        tx.commit().await?;

        tracing::debug!(
            submission_id,
            responses = responses.len(),
            opened = opened_pendency_ids.len(),
            already_pending = already_pending_item_ids.len(),
            "Checklist submission stored",
        );

        Ok(SubmissionOutcome {
            submission_id,
            response_count: responses.len(),
            opened_pendency_ids,
            already_pending_item_ids,
        })
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!("{SELECT} WHERE s.id = $1");
        sqlx::query_as::<_, Submission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List submissions, newest first, scoped by the vehicle's unit.
    pub async fn list(
        pool: &PgPool,
        filter: &SubmissionFilter,
        unit: Option<&str>,
    ) -> Result<Vec<Submission>, sqlx::Error> {
        let query = format!(
            "{SELECT}
             WHERE ($1::TEXT IS NULL OR v.unit = $1)
               AND ($2::BIGINT IS NULL OR s.vehicle_id = $2)
               AND ($3::BIGINT IS NULL OR s.driver_id = $3)
               AND ($4::BIGINT IS NULL OR s.checklist_id = $4)
             ORDER BY s.submitted_at DESC, s.id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(unit)
            .bind(filter.vehicle_id)
            .bind(filter.driver_id)
            .bind(filter.checklist_id)
            .bind(clamp_limit(filter.limit, DEFAULT_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    /// Submissions a driver made, newest first.
    pub async fn list_for_driver(
        pool: &PgPool,
        driver_id: DbId,
        limit: Option<i64>,
    ) -> Result<Vec<Submission>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE s.driver_id = $1 ORDER BY s.submitted_at DESC, s.id DESC LIMIT $2"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(driver_id)
            .bind(clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT))
            .fetch_all(pool)
            .await
    }

    /// Responses of a submission in checklist order.
    pub async fn responses(
        pool: &PgPool,
        submission_id: DbId,
    ) -> Result<Vec<ItemResponse>, sqlx::Error> {
        sqlx::query_as::<_, ItemResponse>(
            "SELECT r.id, r.submission_id, r.item_id, i.text AS item_text,
                    p.text AS parent_text, r.conformity, r.note
             FROM checklist_item_responses r
             JOIN checklist_items i ON i.id = r.item_id
             LEFT JOIN checklist_items p ON p.id = i.parent_id
             WHERE r.submission_id = $1
             ORDER BY COALESCE(p.sort_order, i.sort_order), COALESCE(p.id, i.id),
                      i.parent_id NULLS FIRST, i.sort_order, i.id",
        )
        .bind(submission_id)
        .fetch_all(pool)
        .await
    }
}
