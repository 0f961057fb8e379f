//! Handler for the admin dashboard counters.

use axum::extract::State;
use axum::Json;
use fleetcheck_db::models::dashboard::DashboardCounts;
use fleetcheck_db::repositories::ReportRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;

/// GET /api/v1/admin/dashboard
///
/// Counts are limited to the caller's unit unless they are an admin.
pub async fn get_dashboard(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
) -> AppResult<Json<DashboardCounts>> {
    let counts = ReportRepo::dashboard_counts(&state.pool, staff.scope.filter()).await?;
    Ok(Json(counts))
}
