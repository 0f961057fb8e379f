//! Read-only aggregate queries for reports and the admin dashboard.

use chrono::{Days, NaiveDate, NaiveTime, TimeZone, Utc};
use fleetcheck_core::report::ReportFilter;
use fleetcheck_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::dashboard::DashboardCounts;
use crate::models::submission::SubmissionSummaryRow;

pub struct ReportRepo;

/// Start of `date` in UTC.
fn day_start(date: NaiveDate) -> Timestamp {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

impl ReportRepo {
    /// One row per submission matching the filter, with item counts.
    ///
    /// `to` is inclusive: the whole day is covered.
    pub async fn submission_summaries(
        pool: &PgPool,
        filter: &ReportFilter,
        unit: Option<&str>,
    ) -> Result<Vec<SubmissionSummaryRow>, sqlx::Error> {
        let from = filter.from.map(day_start);
        let until = filter
            .to
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .map(day_start);

        sqlx::query_as::<_, SubmissionSummaryRow>(
            "SELECT s.id AS submission_id, s.submitted_at,
                    d.name AS driver_name, v.name AS vehicle_name,
                    c.name AS checklist_name, c.kind AS checklist_kind,
                    COUNT(r.id) AS total_items,
                    COUNT(r.id) FILTER (WHERE r.conformity = 'non_conforming') AS non_conforming
             FROM checklist_submissions s
             JOIN checklists c ON c.id = s.checklist_id
             JOIN drivers d ON d.id = s.driver_id
             JOIN vehicles v ON v.id = s.vehicle_id
             LEFT JOIN checklist_item_responses r ON r.submission_id = s.id
             WHERE ($1::TIMESTAMPTZ IS NULL OR s.submitted_at >= $1)
               AND ($2::TIMESTAMPTZ IS NULL OR s.submitted_at < $2)
               AND ($3::BIGINT IS NULL OR s.vehicle_id = $3)
               AND ($4::TEXT IS NULL OR c.kind = $4)
               AND ($5::TEXT IS NULL OR v.unit = $5)
             GROUP BY s.id, d.name, v.name, c.name, c.kind
             ORDER BY s.submitted_at DESC, s.id DESC",
        )
        .bind(from)
        .bind(until)
        .bind(filter.vehicle_id)
        .bind(&filter.checklist_kind)
        .bind(unit)
        .fetch_all(pool)
        .await
    }

    /// Dashboard counters, scoped to a unit when given.
    pub async fn dashboard_counts(
        pool: &PgPool,
        unit: Option<&str>,
    ) -> Result<DashboardCounts, sqlx::Error> {
        sqlx::query_as::<_, DashboardCounts>(
            "SELECT
                (SELECT COUNT(*) FROM drivers
                  WHERE is_active AND ($1::TEXT IS NULL OR unit = $1)) AS drivers,
                (SELECT COUNT(*) FROM vehicles
                  WHERE $1::TEXT IS NULL OR unit = $1) AS vehicles,
                (SELECT COUNT(*) FROM checklists
                  WHERE is_active AND ($1::TEXT IS NULL OR unit = $1)) AS active_checklists,
                (SELECT COUNT(*) FROM checklist_submissions s
                  JOIN vehicles v ON v.id = s.vehicle_id
                  WHERE s.submitted_at >= date_trunc('day', NOW())
                    AND ($1::TEXT IS NULL OR v.unit = $1)) AS submissions_today,
                (SELECT COUNT(*) FROM pendencies p
                  JOIN vehicles v ON v.id = p.vehicle_id
                  WHERE p.status = 'open'
                    AND ($1::TEXT IS NULL OR v.unit = $1)) AS open_pendencies,
                (SELECT COUNT(*) FROM pendencies p
                  JOIN vehicles v ON v.id = p.vehicle_id
                  WHERE p.status = 'in_progress'
                    AND ($1::TEXT IS NULL OR v.unit = $1)) AS in_progress_pendencies",
        )
        .bind(unit)
        .fetch_one(pool)
        .await
    }
}
