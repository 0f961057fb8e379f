//! Repository for the `pendencies` table.

use fleetcheck_core::paging::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use fleetcheck_core::types::DbId;
use sqlx::PgPool;

use crate::models::pendency::{Pendency, PendencyFilter, PendencyTransition};

/// Select list joined with the item, checklist, vehicle, response, and resolver.
const SELECT: &str = "SELECT p.id, p.item_id, i.text AS item_text, \
                      i.checklist_id, c.name AS checklist_name, \
                      p.vehicle_id, v.name AS vehicle_name, v.unit, \
                      p.submission_id, p.response_id, r.note AS response_note, \
                      p.status, p.opened_at, p.resolution_note, \
                      p.resolved_by, u.username AS resolved_by_username, \
                      p.resolved_at, p.updated_at \
                      FROM pendencies p \
                      JOIN checklist_items i ON i.id = p.item_id \
                      JOIN checklists c ON c.id = i.checklist_id \
                      JOIN vehicles v ON v.id = p.vehicle_id \
                      JOIN checklist_item_responses r ON r.id = p.response_id \
                      LEFT JOIN users u ON u.id = p.resolved_by";

pub struct PendencyRepo;

impl PendencyRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Pendency>, sqlx::Error> {
        let query = format!("{SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, Pendency>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List pendencies scoped by the vehicle's unit: active ones first, then
    /// newest opened first.
    pub async fn list(
        pool: &PgPool,
        filter: &PendencyFilter,
        unit: Option<&str>,
    ) -> Result<Vec<Pendency>, sqlx::Error> {
        let query = format!(
            "{SELECT}
             WHERE ($1::TEXT IS NULL OR v.unit = $1)
               AND ($2::TEXT IS NULL OR p.status = $2)
               AND ($3::BIGINT IS NULL OR p.vehicle_id = $3)
             ORDER BY (p.status IN ('open', 'in_progress')) DESC, p.opened_at DESC, p.id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Pendency>(&query)
            .bind(unit)
            .bind(&filter.status)
            .bind(filter.vehicle_id)
            .bind(clamp_limit(filter.limit, DEFAULT_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    /// Pendencies opened by one submission.
    pub async fn list_by_submission(
        pool: &PgPool,
        submission_id: DbId,
    ) -> Result<Vec<Pendency>, sqlx::Error> {
        let query = format!("{SELECT} WHERE p.submission_id = $1 ORDER BY p.id");
        sqlx::query_as::<_, Pendency>(&query)
            .bind(submission_id)
            .fetch_all(pool)
            .await
    }

    /// Item ids with an active pendency on the given vehicle.
    pub async fn active_item_ids(
        pool: &PgPool,
        vehicle_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT item_id FROM pendencies
             WHERE vehicle_id = $1 AND status IN ('open', 'in_progress')
             ORDER BY item_id",
        )
        .bind(vehicle_id)
        .fetch_all(pool)
        .await
    }

    /// Move a pendency from `expected` to the status in `change`.
    ///
    /// Returns `false` when the row no longer has status `expected`, which
    /// happens when another staff member moved it first. Terminal statuses
    /// stamp `resolved_at`; moving to `in_progress` leaves it empty.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        change: &PendencyTransition<'_>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE pendencies SET
                status = $3,
                resolution_note = COALESCE($4, resolution_note),
                resolved_by = $5,
                resolved_at = CASE WHEN $3 IN ('resolved', 'rejected') THEN NOW() ELSE NULL END
             WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(expected)
        .bind(change.status)
        .bind(change.resolution_note)
        .bind(change.resolved_by)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
