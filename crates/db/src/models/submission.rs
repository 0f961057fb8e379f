//! Checklist submissions, item responses, and report rows.

use fleetcheck_core::checklist::Conformity;
use fleetcheck_core::report::SubmissionSummary;
use fleetcheck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A submission row joined with driver, vehicle, and checklist names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Submission {
    pub id: DbId,
    pub checklist_id: DbId,
    pub checklist_name: String,
    pub driver_id: DbId,
    pub driver_name: String,
    pub vehicle_id: DbId,
    pub vehicle_name: String,
    pub unit: String,
    pub submitted_at: Timestamp,
    pub observations: Option<String>,
    pub location: Option<String>,
    pub odometer_km: Option<i64>,
    pub driver_signature_path: Option<String>,
    pub inspector_signature_path: Option<String>,
}

/// An item response joined with the item text and its parent's text.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ItemResponse {
    pub id: DbId,
    pub submission_id: DbId,
    pub item_id: DbId,
    pub item_text: String,
    pub parent_text: Option<String>,
    pub conformity: String,
    pub note: Option<String>,
}

pub struct CreateSubmission {
    pub checklist_id: DbId,
    pub driver_id: DbId,
    pub vehicle_id: DbId,
    pub observations: Option<String>,
    pub location: Option<String>,
    pub odometer_km: Option<i64>,
    pub driver_signature_path: Option<String>,
    pub inspector_signature_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewResponse {
    pub item_id: DbId,
    pub conformity: Conformity,
    pub note: Option<String>,
}

/// Result of persisting a submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub submission_id: DbId,
    pub response_count: usize,
    /// Pendencies opened by this submission.
    pub opened_pendency_ids: Vec<DbId>,
    /// Non-conforming items that already had an active pendency for the vehicle.
    pub already_pending_item_ids: Vec<DbId>,
}

/// Filters for the admin submission listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionFilter {
    pub vehicle_id: Option<DbId>,
    pub driver_id: Option<DbId>,
    pub checklist_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Aggregated row for the consolidated report.
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionSummaryRow {
    pub submission_id: DbId,
    pub submitted_at: Timestamp,
    pub driver_name: String,
    pub vehicle_name: String,
    pub checklist_name: String,
    pub checklist_kind: String,
    pub total_items: i64,
    pub non_conforming: i64,
}

impl From<SubmissionSummaryRow> for SubmissionSummary {
    fn from(r: SubmissionSummaryRow) -> Self {
        Self {
            submission_id: r.submission_id,
            submitted_at: r.submitted_at,
            driver_name: r.driver_name,
            vehicle_name: r.vehicle_name,
            checklist_name: r.checklist_name,
            checklist_kind: r.checklist_kind,
            total_items: r.total_items,
            non_conforming: r.non_conforming,
        }
    }
}
