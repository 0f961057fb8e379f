//! Handlers for `/admin/pendencies`.
//!
//! Pendencies are opened by checklist submissions and worked by staff through
//! the status lifecycle in [`fleetcheck_core::pendency`].

use axum::extract::{Path, Query, State};
use axum::Json;
use fleetcheck_core::error::CoreError;
use fleetcheck_core::pendency::{validate_transition, PendencyStatus};
use fleetcheck_core::types::DbId;
use fleetcheck_db::models::pendency::{Pendency, PendencyFilter, PendencyTransition};
use fleetcheck_db::repositories::PendencyRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/pendencies/{id}/transition`.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: PendencyStatus,
    pub note: Option<String>,
}

async fn find_or_404(state: &AppState, id: DbId) -> AppResult<Pendency> {
    PendencyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Pendency",
            id,
        }))
}

/// GET /api/v1/admin/pendencies
///
/// Filter with `status` and `vehicle_id`. Active pendencies come first.
pub async fn list_pendencies(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Query(filter): Query<PendencyFilter>,
) -> AppResult<Json<DataResponse<Vec<Pendency>>>> {
    if let Some(status) = &filter.status {
        PendencyStatus::parse(status)?;
    }
    let data = PendencyRepo::list(&state.pool, &filter, staff.scope.filter()).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/pendencies/{id}
pub async fn get_pendency(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<Pendency>> {
    let pendency = find_or_404(&state, id).await?;
    staff.scope.ensure(&pendency.unit)?;
    Ok(Json(pendency))
}

/// POST /api/v1/admin/pendencies/{id}/transition
///
/// Move a pendency along its lifecycle. Closing it (`resolved`/`rejected`)
/// records the acting staff member; a concurrent change by someone else
/// yields 409.
pub async fn transition_pendency(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<TransitionRequest>,
) -> AppResult<Json<Pendency>> {
    if !staff.role.can_resolve_pendencies() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Role cannot work pendencies".into(),
        )));
    }
    let pendency = find_or_404(&state, id).await?;
    staff.scope.ensure(&pendency.unit)?;

    let from = PendencyStatus::parse(&pendency.status)?;
    let note = input
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    validate_transition(from, input.status, note)?;

    let change = PendencyTransition {
        status: input.status.as_str(),
        resolution_note: note,
        resolved_by: input.status.is_terminal().then_some(staff.user_id),
    };
    if !PendencyRepo::transition(&state.pool, id, from.as_str(), &change).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Pendency was changed by someone else; reload and try again".into(),
        )));
    }

    tracing::info!(
        pendency_id = id,
        from = from.as_str(),
        to = input.status.as_str(),
        user_id = staff.user_id,
        "Pendency transitioned"
    );
    Ok(Json(find_or_404(&state, id).await?))
}
