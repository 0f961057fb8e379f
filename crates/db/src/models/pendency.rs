//! Pendency (non-conformity) models.

use fleetcheck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A pendency row joined with the item, vehicle, and checklist it concerns.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Pendency {
    pub id: DbId,
    pub item_id: DbId,
    pub item_text: String,
    pub checklist_id: DbId,
    pub checklist_name: String,
    pub vehicle_id: DbId,
    pub vehicle_name: String,
    pub unit: String,
    pub submission_id: DbId,
    pub response_id: DbId,
    pub response_note: Option<String>,
    pub status: String,
    pub opened_at: Timestamp,
    pub resolution_note: Option<String>,
    pub resolved_by: Option<DbId>,
    pub resolved_by_username: Option<String>,
    pub resolved_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PendencyFilter {
    pub status: Option<String>,
    pub vehicle_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A status change applied by staff.
pub struct PendencyTransition<'a> {
    pub status: &'a str,
    pub resolution_note: Option<&'a str>,
    /// Set when moving into a terminal status.
    pub resolved_by: Option<DbId>,
}
