//! Admin dashboard counters.

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardCounts {
    pub drivers: i64,
    pub vehicles: i64,
    pub active_checklists: i64,
    pub submissions_today: i64,
    pub open_pendencies: i64,
    pub in_progress_pendencies: i64,
}
