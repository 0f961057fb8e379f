//! Handlers for `/admin/checklists` and their items.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use fleetcheck_core::checklist::{build_tree, validate_kind, validate_parent, ItemNode};
use fleetcheck_core::credentials::require_text;
use fleetcheck_core::error::CoreError;
use fleetcheck_core::roles::UnitScope;
use fleetcheck_core::types::DbId;
use fleetcheck_db::models::checklist::{
    Checklist, ChecklistItem, CreateChecklist, CreateChecklistItem, UpdateChecklist,
    UpdateChecklistItem,
};
use fleetcheck_db::repositories::{ChecklistItemRepo, ChecklistRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireFleetManager, RequireStaff};
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/checklists`.
#[derive(Debug, Deserialize)]
pub struct CreateChecklistRequest {
    pub name: String,
    pub code: String,
    pub version: Option<i32>,
    pub kind: String,
    pub unit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChecklistDetail {
    pub checklist: Checklist,
    pub items: Vec<ItemNode<ChecklistItem>>,
}

async fn find_in_scope(state: &AppState, scope: &UnitScope, id: DbId) -> AppResult<Checklist> {
    let checklist = ChecklistRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Checklist",
            id,
        }))?;
    scope.ensure(&checklist.unit)?;
    Ok(checklist)
}

async fn find_item(
    state: &AppState,
    checklist_id: DbId,
    item_id: DbId,
) -> AppResult<ChecklistItem> {
    ChecklistItemRepo::find_by_id(&state.pool, item_id)
        .await?
        .filter(|item| item.checklist_id == checklist_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ChecklistItem",
            id: item_id,
        }))
}

// ---------------------------------------------------------------------------
// Checklists
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/checklists
pub async fn list_checklists(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Checklist>>>> {
    let data =
        ChecklistRepo::list(&state.pool, staff.scope.filter(), !params.include_inactive).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/checklists/{id}
///
/// The checklist with its two-level item tree.
pub async fn get_checklist(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<ChecklistDetail>> {
    let checklist = find_in_scope(&state, &staff.scope, id).await?;
    let items = ChecklistItemRepo::list_by_checklist(&state.pool, id).await?;
    Ok(Json(ChecklistDetail {
        checklist,
        items: build_tree(&items)?,
    }))
}

/// POST /api/v1/admin/checklists
pub async fn create_checklist(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Json(input): Json<CreateChecklistRequest>,
) -> AppResult<(StatusCode, Json<Checklist>)> {
    require_text("name", &input.name)?;
    require_text("code", &input.code)?;
    validate_kind(&input.kind)?;
    if input.version.is_some_and(|v| v < 1) {
        return Err(AppError::Core(CoreError::Validation(
            "version must be at least 1".into(),
        )));
    }
    let unit = staff.scope.resolve_unit(input.unit.as_deref())?;

    let checklist = ChecklistRepo::create(
        &state.pool,
        &CreateChecklist {
            name: input.name.trim().to_string(),
            code: input.code.trim().to_string(),
            version: input.version,
            kind: input.kind,
            unit,
        },
    )
    .await?;

    tracing::info!(
        checklist_id = checklist.id,
        code = %checklist.code,
        version = checklist.version,
        "Checklist created"
    );
    Ok((StatusCode::CREATED, Json(checklist)))
}

/// PUT /api/v1/admin/checklists/{id}
pub async fn update_checklist(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateChecklist>,
) -> AppResult<Json<Checklist>> {
    find_in_scope(&state, &staff.scope, id).await?;
    if let Some(name) = &input.name {
        require_text("name", name)?;
    }
    if let Some(kind) = &input.kind {
        validate_kind(kind)?;
    }
    let checklist = ChecklistRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Checklist",
            id,
        }))?;
    Ok(Json(checklist))
}

/// DELETE /api/v1/admin/checklists/{id}
///
/// A checklist that was already filled cannot be deleted (409); deactivate it.
pub async fn delete_checklist(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_in_scope(&state, &staff.scope, id).await?;
    ChecklistRepo::delete(&state.pool, id).await?;
    tracing::info!(checklist_id = id, deleted_by = staff.user_id, "Checklist deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/checklists/{id}/items
///
/// `parent_id` must name a top-level item of the same checklist.
pub async fn create_item(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path(checklist_id): Path<DbId>,
    Json(input): Json<CreateChecklistItem>,
) -> AppResult<(StatusCode, Json<ChecklistItem>)> {
    find_in_scope(&state, &staff.scope, checklist_id).await?;
    require_text("text", &input.text)?;

    if let Some(parent_id) = input.parent_id {
        let parent = ChecklistItemRepo::find_by_id(&state.pool, parent_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "ChecklistItem",
                id: parent_id,
            }))?;
        validate_parent(
            checklist_id,
            None,
            (parent.checklist_id, parent.parent_id),
            parent_id,
        )?;
    }

    let item = ChecklistItemRepo::create(&state.pool, checklist_id, &input).await?;
    tracing::debug!(
        checklist_id,
        item_id = item.id,
        parent_id = ?item.parent_id,
        "Checklist item created"
    );
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/v1/admin/checklists/{id}/items/{item_id}
pub async fn update_item(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path((checklist_id, item_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateChecklistItem>,
) -> AppResult<Json<ChecklistItem>> {
    find_in_scope(&state, &staff.scope, checklist_id).await?;
    find_item(&state, checklist_id, item_id).await?;
    if let Some(text) = &input.text {
        require_text("text", text)?;
    }
    let item = ChecklistItemRepo::update(&state.pool, item_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ChecklistItem",
            id: item_id,
        }))?;
    Ok(Json(item))
}

/// DELETE /api/v1/admin/checklists/{id}/items/{item_id}
///
/// Deleting a group item deletes its sub-items. Items that were already
/// answered cannot be deleted (409).
pub async fn delete_item(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path((checklist_id, item_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    find_in_scope(&state, &staff.scope, checklist_id).await?;
    find_item(&state, checklist_id, item_id).await?;
    ChecklistItemRepo::delete(&state.pool, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
