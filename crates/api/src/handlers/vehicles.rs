//! Handlers for `/admin/vehicles` (vehicle sets, "conjuntos").
//!
//! A vehicle set is one tractor plate plus up to two trailer plates. The
//! composition is validated in [`fleetcheck_core::fleet`] before any write.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fleetcheck_core::credentials::require_text;
use fleetcheck_core::error::CoreError;
use fleetcheck_core::fleet::{validate_vehicle_plates, PlateRef};
use fleetcheck_core::roles::UnitScope;
use fleetcheck_core::types::DbId;
use fleetcheck_db::models::plate::Plate;
use fleetcheck_db::models::vehicle::{CreateVehicle, UpdateVehicle, Vehicle};
use fleetcheck_db::repositories::{DriverRepo, PlateRepo, VehicleRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireFleetManager, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/vehicles`.
#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    pub name: String,
    pub tractor_plate_id: DbId,
    #[serde(default)]
    pub trailer_plate_ids: Vec<DbId>,
    pub unit: Option<String>,
    pub operation: Option<String>,
}

/// Request body for `PUT /admin/vehicles/{id}`.
///
/// `trailer_plate_ids`, when present, replaces both trailer slots.
#[derive(Debug, Deserialize)]
pub struct UpdateVehicleRequest {
    pub name: Option<String>,
    pub tractor_plate_id: Option<DbId>,
    pub trailer_plate_ids: Option<Vec<DbId>>,
    pub unit: Option<String>,
    pub operation: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_in_scope(state: &AppState, scope: &UnitScope, id: DbId) -> AppResult<Vehicle> {
    let vehicle = VehicleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Vehicle", id }))?;
    scope.ensure(&vehicle.unit)?;
    Ok(vehicle)
}

/// The slots a vehicle currently holds, for detecting newly mounted plates.
fn mounted_plate_ids(vehicle: &Vehicle) -> Vec<DbId> {
    std::iter::once(vehicle.tractor_plate_id)
        .chain(vehicle.trailer1_plate_id)
        .chain(vehicle.trailer2_plate_id)
        .collect()
}

/// Load and validate a tractor + trailers composition for a vehicle of `unit`.
///
/// `mounted` lists plates already on the vehicle being edited; any other plate
/// must not belong to another vehicle set.
async fn resolve_composition(
    state: &AppState,
    unit: &str,
    tractor_id: DbId,
    trailer_ids: &[DbId],
    mounted: &[DbId],
) -> AppResult<(DbId, Option<DbId>, Option<DbId>)> {
    let mut plates: Vec<Plate> = Vec::with_capacity(1 + trailer_ids.len());
    for id in std::iter::once(&tractor_id).chain(trailer_ids) {
        let plate = PlateRepo::find_by_id(&state.pool, *id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound { entity: "Plate", id: *id }))?;
        if plate.unit != unit {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Plate {} belongs to unit '{}', not '{unit}'",
                plate.plate, plate.unit
            ))));
        }
        if !mounted.contains(id) && PlateRepo::is_in_use(&state.pool, *id).await? {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Plate {} is already part of another vehicle set",
                plate.plate
            ))));
        }
        plates.push(plate);
    }

    let refs: Vec<PlateRef<'_>> = plates
        .iter()
        .map(|p| PlateRef {
            id: p.id,
            plate: &p.plate,
            kind: &p.kind,
        })
        .collect();
    validate_vehicle_plates(&refs[0], &refs[1..])?;

    Ok((
        tractor_id,
        trailer_ids.first().copied(),
        trailer_ids.get(1).copied(),
    ))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/vehicles
pub async fn list_vehicles(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
) -> AppResult<Json<DataResponse<Vec<Vehicle>>>> {
    let data = VehicleRepo::list(&state.pool, staff.scope.filter()).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/vehicles/{id}
pub async fn get_vehicle(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vehicle>> {
    Ok(Json(find_in_scope(&state, &staff.scope, id).await?))
}

/// POST /api/v1/admin/vehicles
pub async fn create_vehicle(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Json(input): Json<CreateVehicleRequest>,
) -> AppResult<(StatusCode, Json<Vehicle>)> {
    require_text("name", &input.name)?;
    let unit = staff.scope.resolve_unit(input.unit.as_deref())?;
    let (tractor, trailer1, trailer2) = resolve_composition(
        &state,
        &unit,
        input.tractor_plate_id,
        &input.trailer_plate_ids,
        &[],
    )
    .await?;

    let vehicle = VehicleRepo::create(
        &state.pool,
        &CreateVehicle {
            name: input.name.trim().to_string(),
            tractor_plate_id: tractor,
            trailer1_plate_id: trailer1,
            trailer2_plate_id: trailer2,
            unit,
            operation: input.operation,
        },
    )
    .await?;

    tracing::info!(vehicle_id = vehicle.id, name = %vehicle.name, "Vehicle set created");
    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// PUT /api/v1/admin/vehicles/{id}
///
/// Moving the set to another unit is refused (409) while drivers of the
/// current unit are assigned to it.
pub async fn update_vehicle(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateVehicleRequest>,
) -> AppResult<Json<Vehicle>> {
    let existing = find_in_scope(&state, &staff.scope, id).await?;

    if let Some(name) = &input.name {
        require_text("name", name)?;
    }
    let unit = match input.unit.as_deref() {
        Some(requested) => staff.scope.resolve_unit(Some(requested))?,
        None => existing.unit.clone(),
    };
    if unit != existing.unit {
        let assigned = DriverRepo::count_assigned_outside_unit(&state.pool, id, &unit).await?;
        if assigned > 0 {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "{assigned} driver(s) of another unit are assigned to vehicle set {}; \
                 reassign them before moving it",
                existing.name
            ))));
        }
    }
    let mounted = mounted_plate_ids(&existing);
    let trailer_ids = input
        .trailer_plate_ids
        .unwrap_or_else(|| mounted[1..].to_vec());
    let (tractor, trailer1, trailer2) = resolve_composition(
        &state,
        &unit,
        input.tractor_plate_id.unwrap_or(existing.tractor_plate_id),
        &trailer_ids,
        &mounted,
    )
    .await?;

    let update = UpdateVehicle {
        name: input
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name),
        tractor_plate_id: tractor,
        trailer1_plate_id: trailer1,
        trailer2_plate_id: trailer2,
        unit,
        operation: input.operation.or(existing.operation),
    };
    let vehicle = VehicleRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Vehicle", id }))?;
    Ok(Json(vehicle))
}

/// DELETE /api/v1/admin/vehicles/{id}
///
/// Assigned drivers are unassigned. Vehicles with submissions cannot be
/// deleted (409).
pub async fn delete_vehicle(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_in_scope(&state, &staff.scope, id).await?;
    VehicleRepo::delete(&state.pool, id).await?;
    tracing::info!(vehicle_id = id, deleted_by = staff.user_id, "Vehicle set deleted");
    Ok(StatusCode::NO_CONTENT)
}
