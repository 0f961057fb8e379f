//! Handlers for `/admin/drivers`.
//!
//! Any staff member may read drivers of their scope; changes require
//! [`RequireFleetManager`]. Masters only touch drivers of their own unit.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fleetcheck_core::credentials::{require_text, validate_cpf};
use fleetcheck_core::error::CoreError;
use fleetcheck_core::roles::UnitScope;
use fleetcheck_core::types::DbId;
use fleetcheck_db::models::driver::{CreateDriver, Driver, UpdateDriver};
use fleetcheck_db::repositories::{DriverRepo, SessionRepo, VehicleRepo};
use serde::Deserialize;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireFleetManager, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/drivers`.
#[derive(Debug, Deserialize)]
pub struct CreateDriverRequest {
    pub name: String,
    pub cpf: String,
    pub rg: String,
    pub cnh: String,
    /// Defaults to the caller's unit; only admins may pick another.
    pub unit: Option<String>,
    pub operation: Option<String>,
    pub vehicle_id: Option<DbId>,
    /// Omit to let the driver log in with the CPF-derived credential.
    pub password: Option<String>,
}

/// Request body for `POST /admin/drivers/{id}/password`.
#[derive(Debug, Deserialize)]
pub struct SetDriverPasswordRequest {
    /// `None` clears the password so the CPF-derived credential applies again.
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_in_scope(state: &AppState, scope: &UnitScope, id: DbId) -> AppResult<Driver> {
    let driver = DriverRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Driver", id }))?;
    scope.ensure(&driver.unit)?;
    Ok(driver)
}

/// A driver may only be assigned a vehicle of the same unit.
async fn check_vehicle(state: &AppState, vehicle_id: DbId, unit: &str) -> AppResult<()> {
    let vehicle = VehicleRepo::find_by_id(&state.pool, vehicle_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Vehicle",
            id: vehicle_id,
        }))?;
    if vehicle.unit != unit {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Vehicle '{}' belongs to unit '{}', not '{unit}'",
            vehicle.name, vehicle.unit
        ))));
    }
    Ok(())
}

fn hash_new_password(password: &str) -> AppResult<String> {
    validate_password_strength(password, MIN_PASSWORD_LENGTH)?;
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/drivers
pub async fn list_drivers(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
) -> AppResult<Json<DataResponse<Vec<Driver>>>> {
    let data = DriverRepo::list(&state.pool, staff.scope.filter()).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/drivers/{id}
pub async fn get_driver(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<Driver>> {
    let driver = find_in_scope(&state, &staff.scope, id).await?;
    Ok(Json(driver))
}

/// POST /api/v1/admin/drivers
///
/// The CPF is stored normalized so logins match regardless of punctuation.
pub async fn create_driver(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Json(input): Json<CreateDriverRequest>,
) -> AppResult<(StatusCode, Json<Driver>)> {
    require_text("name", &input.name)?;
    require_text("rg", &input.rg)?;
    require_text("cnh", &input.cnh)?;
    let cpf = validate_cpf(&input.cpf)?;
    let unit = staff.scope.resolve_unit(input.unit.as_deref())?;

    if let Some(vehicle_id) = input.vehicle_id {
        check_vehicle(&state, vehicle_id, &unit).await?;
    }
    let password_hash = input
        .password
        .as_deref()
        .map(hash_new_password)
        .transpose()?;

    let driver = DriverRepo::create(
        &state.pool,
        &CreateDriver {
            name: input.name.trim().to_string(),
            cpf,
            rg: input.rg.trim().to_string(),
            cnh: input.cnh.trim().to_string(),
            unit,
            operation: input.operation,
            vehicle_id: input.vehicle_id,
            password_hash,
        },
    )
    .await?;

    tracing::info!(
        driver_id = driver.id,
        unit = %driver.unit,
        created_by = staff.user_id,
        "Driver created"
    );
    Ok((StatusCode::CREATED, Json(driver)))
}

/// PUT /api/v1/admin/drivers/{id}
///
/// Deactivating a driver revokes their sessions.
pub async fn update_driver(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDriver>,
) -> AppResult<Json<Driver>> {
    let existing = find_in_scope(&state, &staff.scope, id).await?;

    let unit = match input.unit.as_deref() {
        Some(requested) => staff.scope.resolve_unit(Some(requested))?,
        None => existing.unit.clone(),
    };
    if let Some(vehicle_id) = input.vehicle_id.filter(|_| !input.clear_vehicle) {
        check_vehicle(&state, vehicle_id, &unit).await?;
    } else if unit != existing.unit && !input.clear_vehicle {
        if let Some(current) = existing.vehicle_id {
            check_vehicle(&state, current, &unit).await?;
        }
    }
    for (field, value) in [("name", &input.name), ("rg", &input.rg), ("cnh", &input.cnh)] {
        if let Some(value) = value {
            require_text(field, value)?;
        }
    }

    let update = UpdateDriver {
        unit: Some(unit),
        ..input
    };
    let driver = DriverRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Driver", id }))?;

    if existing.is_active && !driver.is_active {
        let revoked = SessionRepo::revoke_all_for_driver(&state.pool, id).await?;
        tracing::info!(driver_id = id, revoked, "Driver deactivated");
    }
    Ok(Json(driver))
}

/// POST /api/v1/admin/drivers/{id}/password
///
/// Set or clear a driver's password. Existing sessions are revoked either way.
pub async fn set_driver_password(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path(id): Path<DbId>,
    Json(input): Json<SetDriverPasswordRequest>,
) -> AppResult<StatusCode> {
    find_in_scope(&state, &staff.scope, id).await?;

    let password_hash = input
        .password
        .as_deref()
        .map(hash_new_password)
        .transpose()?;
    DriverRepo::update_password(&state.pool, id, password_hash.as_deref()).await?;
    SessionRepo::revoke_all_for_driver(&state.pool, id).await?;

    tracing::info!(
        driver_id = id,
        cleared = password_hash.is_none(),
        changed_by = staff.user_id,
        "Driver password reset"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/drivers/{id}
///
/// Drivers with checklist submissions cannot be deleted (409); deactivate
/// them instead.
pub async fn delete_driver(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_in_scope(&state, &staff.scope, id).await?;
    if !DriverRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Driver", id }));
    }
    tracing::info!(driver_id = id, deleted_by = staff.user_id, "Driver deleted");
    Ok(StatusCode::NO_CONTENT)
}
