//! Handlers for `/admin/plates`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use fleetcheck_core::credentials::validate_plate;
use fleetcheck_core::error::CoreError;
use fleetcheck_core::fleet::validate_plate_kind;
use fleetcheck_core::roles::UnitScope;
use fleetcheck_core::types::DbId;
use fleetcheck_db::models::plate::{CreatePlate, Plate, UpdatePlate};
use fleetcheck_db::repositories::PlateRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireFleetManager, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/plates`.
#[derive(Debug, Deserialize)]
pub struct CreatePlateRequest {
    pub plate: String,
    pub kind: String,
    pub unit: Option<String>,
}

/// Query parameters for `GET /admin/plates`.
#[derive(Debug, Deserialize)]
pub struct PlateListParams {
    pub kind: Option<String>,
}

async fn find_in_scope(state: &AppState, scope: &UnitScope, id: DbId) -> AppResult<Plate> {
    let plate = PlateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Plate", id }))?;
    scope.ensure(&plate.unit)?;
    Ok(plate)
}

/// GET /api/v1/admin/plates
pub async fn list_plates(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Query(params): Query<PlateListParams>,
) -> AppResult<Json<DataResponse<Vec<Plate>>>> {
    if let Some(kind) = &params.kind {
        validate_plate_kind(kind)?;
    }
    let data = PlateRepo::list(&state.pool, staff.scope.filter(), params.kind.as_deref()).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/plates/{id}
pub async fn get_plate(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<Plate>> {
    Ok(Json(find_in_scope(&state, &staff.scope, id).await?))
}

/// POST /api/v1/admin/plates
///
/// The identifier is stored normalized (`abc-1d23` becomes `ABC1D23`).
pub async fn create_plate(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Json(input): Json<CreatePlateRequest>,
) -> AppResult<(StatusCode, Json<Plate>)> {
    let plate = validate_plate(&input.plate)?;
    validate_plate_kind(&input.kind)?;
    let unit = staff.scope.resolve_unit(input.unit.as_deref())?;

    let created = PlateRepo::create(
        &state.pool,
        &CreatePlate {
            plate,
            kind: input.kind,
            unit,
        },
    )
    .await?;

    tracing::info!(plate_id = created.id, plate = %created.plate, "Plate created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/admin/plates/{id}
///
/// A plate mounted in a vehicle set cannot change kind or unit.
pub async fn update_plate(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePlate>,
) -> AppResult<Json<Plate>> {
    let existing = find_in_scope(&state, &staff.scope, id).await?;

    if let Some(kind) = &input.kind {
        validate_plate_kind(kind)?;
        if *kind != existing.kind && PlateRepo::is_in_use(&state.pool, id).await? {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Plate {} is part of a vehicle set; remove it before changing its kind",
                existing.plate
            ))));
        }
    }
    let unit = match input.unit.as_deref() {
        Some(requested) => Some(staff.scope.resolve_unit(Some(requested))?),
        None => None,
    };
    if let Some(unit) = &unit {
        if *unit != existing.unit && PlateRepo::is_in_use(&state.pool, id).await? {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Plate {} is part of a vehicle set; remove it before moving it to another unit",
                existing.plate
            ))));
        }
    }

    let plate = PlateRepo::update(&state.pool, id, &UpdatePlate { unit, ..input })
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Plate", id }))?;
    Ok(Json(plate))
}

/// DELETE /api/v1/admin/plates/{id}
pub async fn delete_plate(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let plate = find_in_scope(&state, &staff.scope, id).await?;
    if PlateRepo::is_in_use(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Plate {} is part of a vehicle set",
            plate.plate
        ))));
    }
    PlateRepo::delete(&state.pool, id).await?;
    tracing::info!(plate_id = id, deleted_by = staff.user_id, "Plate deleted");
    Ok(StatusCode::NO_CONTENT)
}
