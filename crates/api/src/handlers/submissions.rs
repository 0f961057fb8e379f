//! Handlers for `/admin/submissions` (read-only history of filled checklists).

use axum::extract::{Path, Query, State};
use axum::Json;
use fleetcheck_core::error::CoreError;
use fleetcheck_core::types::DbId;
use fleetcheck_db::models::pendency::Pendency;
use fleetcheck_db::models::submission::{ItemResponse, Submission, SubmissionFilter};
use fleetcheck_db::repositories::{PendencyRepo, SubmissionRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubmissionDetail {
    pub submission: Submission,
    pub responses: Vec<ItemResponse>,
    /// Pendencies opened by this submission.
    pub pendencies: Vec<Pendency>,
}

/// GET /api/v1/admin/submissions
///
/// Newest first; filter with `vehicle_id`, `driver_id`, `checklist_id`,
/// `limit` and `offset`.
pub async fn list_submissions(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Query(filter): Query<SubmissionFilter>,
) -> AppResult<Json<DataResponse<Vec<Submission>>>> {
    let data = SubmissionRepo::list(&state.pool, &filter, staff.scope.filter()).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/submissions/{id}
pub async fn get_submission(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<SubmissionDetail>> {
    let submission = SubmissionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Submission",
            id,
        }))?;
    staff.scope.ensure(&submission.unit)?;

    let responses = SubmissionRepo::responses(&state.pool, id).await?;
    let pendencies = PendencyRepo::list_by_submission(&state.pool, id).await?;
    Ok(Json(SubmissionDetail {
        submission,
        responses,
        pendencies,
    }))
}
