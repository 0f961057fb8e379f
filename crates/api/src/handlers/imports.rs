//! Handlers for `/admin/imports`: bulk creation from CSV spreadsheets.
//!
//! Each endpoint takes a multipart form with a `file` part. Rows are parsed
//! and validated independently; rows that fail (bad data, already
//! registered, outside the caller's unit) are reported with their
//! spreadsheet line and skipped. The remaining rows are inserted in a single
//! transaction.

use std::collections::HashSet;

use axum::extract::{Multipart, State};
use axum::Json;
use fleetcheck_core::error::CoreError;
use fleetcheck_core::fleet::{validate_vehicle_plates, PlateRef};
use fleetcheck_core::import::{parse_drivers, parse_plates, parse_vehicles, RowError, VehicleRow};
use fleetcheck_core::roles::UnitScope;
use fleetcheck_db::models::driver::CreateDriver;
use fleetcheck_db::models::plate::{CreatePlate, Plate};
use fleetcheck_db::models::vehicle::CreateVehicle;
use fleetcheck_db::repositories::{DriverRepo, PlateRepo, VehicleRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireFleetManager;
use crate::state::AppState;
use crate::storage::read_multipart;

/// Outcome of an import.
#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub created: u64,
    pub skipped: Vec<RowError>,
}

async fn read_csv(multipart: Multipart) -> AppResult<Vec<u8>> {
    let form = read_multipart(multipart).await?;
    form.file
        .map(|f| f.data)
        .ok_or_else(|| AppError::BadRequest("Missing 'file' part".into()))
}

fn skip(skipped: &mut Vec<RowError>, line: usize, message: impl Into<String>) {
    skipped.push(RowError {
        line,
        message: message.into(),
    });
}

fn scope_error(scope: &UnitScope, unit: &str) -> Option<String> {
    scope.ensure(unit).err().map(|_| format!("Unit '{unit}' is outside your scope"))
}

fn finish(created: u64, mut skipped: Vec<RowError>) -> ImportReport {
    skipped.sort_by_key(|e| e.line);
    ImportReport { created, skipped }
}

/// POST /api/v1/admin/imports/drivers (multipart CSV)
///
/// Columns: `name`, `cpf`, `rg`, `cnh`, `unit`, optional `operation`.
/// Imported drivers log in with their CPF-derived credential.
pub async fn import_drivers(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    multipart: Multipart,
) -> AppResult<Json<ImportReport>> {
    let data = read_csv(multipart).await?;
    let parsed = parse_drivers(&data)?;
    let mut skipped = parsed.errors;
    let mut rows = Vec::with_capacity(parsed.rows.len());

    for (line, row) in parsed.rows {
        if let Some(msg) = scope_error(&staff.scope, &row.unit) {
            skip(&mut skipped, line, msg);
            continue;
        }
        let clash = DriverRepo::find_identity_clash(&state.pool, &row.cpf, &row.rg, &row.cnh)
            .await?;
        if let Some(field) = clash {
            let value = match field.as_str() {
                "CPF" => &row.cpf,
                "RG" => &row.rg,
                _ => &row.cnh,
            };
            skip(&mut skipped, line, format!("{field} {value} is already registered"));
            continue;
        }
        rows.push(CreateDriver {
            name: row.name,
            cpf: row.cpf,
            rg: row.rg,
            cnh: row.cnh,
            unit: row.unit,
            operation: row.operation,
            vehicle_id: None,
            password_hash: None,
        });
    }

    let created = DriverRepo::create_many(&state.pool, &rows).await?;
    tracing::info!(created, skipped = skipped.len(), user_id = staff.user_id, "Imported drivers");
    Ok(Json(finish(created, skipped)))
}

/// POST /api/v1/admin/imports/plates (multipart CSV)
///
/// Columns: `plate`, `kind` (`tractor`/`cavalo`, `trailer`/`carreta`), `unit`.
pub async fn import_plates(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    multipart: Multipart,
) -> AppResult<Json<ImportReport>> {
    let data = read_csv(multipart).await?;
    let parsed = parse_plates(&data)?;
    let mut skipped = parsed.errors;
    let mut rows = Vec::with_capacity(parsed.rows.len());

    for (line, row) in parsed.rows {
        if let Some(msg) = scope_error(&staff.scope, &row.unit) {
            skip(&mut skipped, line, msg);
            continue;
        }
        if PlateRepo::find_by_plate(&state.pool, &row.plate).await?.is_some() {
            skip(&mut skipped, line, format!("Plate {} is already registered", row.plate));
            continue;
        }
        rows.push(CreatePlate {
            plate: row.plate,
            kind: row.kind.to_string(),
            unit: row.unit,
        });
    }

    let created = PlateRepo::create_many(&state.pool, &rows).await?;
    tracing::info!(created, skipped = skipped.len(), user_id = staff.user_id, "Imported plates");
    Ok(Json(finish(created, skipped)))
}

/// Resolve a vehicle row's plates against the registered plates.
///
/// `claimed` holds plates taken by earlier rows of the same file.
async fn resolve_vehicle_row(
    state: &AppState,
    row: &VehicleRow,
    claimed: &HashSet<String>,
) -> AppResult<Result<Vec<Plate>, String>> {
    let mut plates = Vec::with_capacity(1 + row.trailer_plates.len());
    for code in std::iter::once(&row.tractor_plate).chain(&row.trailer_plates) {
        let Some(plate) = PlateRepo::find_by_plate(&state.pool, code).await? else {
            return Ok(Err(format!("Plate {code} is not registered")));
        };
        if plate.unit != row.unit {
            return Ok(Err(format!(
                "Plate {code} belongs to unit '{}', not '{}'",
                plate.unit, row.unit
            )));
        }
        if claimed.contains(code) || PlateRepo::is_in_use(&state.pool, plate.id).await? {
            return Ok(Err(format!("Plate {code} is already part of a vehicle set")));
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
    if let Err(e) = validate_vehicle_plates(&refs[0], &refs[1..]) {
        return Ok(Err(match e {
            CoreError::Validation(msg) => msg,
            other => other.to_string(),
        }));
    }
    Ok(Ok(plates))
}

/// POST /api/v1/admin/imports/vehicles (multipart CSV)
///
/// Columns: `name`, `tractor`, optional `trailer1` / `trailer2`, `unit`,
/// optional `operation`. Plates must already be registered in the same unit.
pub async fn import_vehicles(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    multipart: Multipart,
) -> AppResult<Json<ImportReport>> {
    let data = read_csv(multipart).await?;
    let parsed = parse_vehicles(&data)?;
    let mut skipped = parsed.errors;
    let mut rows = Vec::with_capacity(parsed.rows.len());
    let mut names: HashSet<String> = HashSet::new();
    let mut claimed: HashSet<String> = HashSet::new();

    for (line, row) in parsed.rows {
        if let Some(msg) = scope_error(&staff.scope, &row.unit) {
            skip(&mut skipped, line, msg);
            continue;
        }
        let name_taken = names.contains(&row.name)
            || VehicleRepo::find_by_name(&state.pool, &row.name).await?.is_some();
        if name_taken {
            skip(&mut skipped, line, format!("Vehicle set '{}' already exists", row.name));
            continue;
        }
        let plates = match resolve_vehicle_row(&state, &row, &claimed).await? {
            Ok(plates) => plates,
            Err(msg) => {
                skip(&mut skipped, line, msg);
                continue;
            }
        };

        names.insert(row.name.clone());
        claimed.extend(plates.iter().map(|p| p.plate.clone()));
        rows.push(CreateVehicle {
            name: row.name,
            tractor_plate_id: plates[0].id,
            trailer1_plate_id: plates.get(1).map(|p| p.id),
            trailer2_plate_id: plates.get(2).map(|p| p.id),
            unit: row.unit,
            operation: row.operation,
        });
    }

    let created = VehicleRepo::create_many(&state.pool, &rows).await?;
    tracing::info!(
        created,
        skipped = skipped.len(),
        user_id = staff.user_id,
        "Imported vehicle sets"
    );
    Ok(Json(finish(created, skipped)))
}
