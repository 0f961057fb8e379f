//! Driver entity model and DTOs.

use fleetcheck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A driver row joined with the name of the assigned vehicle.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Driver {
    pub id: DbId,
    pub name: String,
    pub cpf: String,
    pub rg: String,
    pub cnh: String,
    pub unit: String,
    pub operation: Option<String>,
    pub vehicle_id: Option<DbId>,
    pub vehicle_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new driver. `cpf` is stored normalized (digits only).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDriver {
    pub name: String,
    pub cpf: String,
    pub rg: String,
    pub cnh: String,
    pub unit: String,
    pub operation: Option<String>,
    pub vehicle_id: Option<DbId>,
    pub password_hash: Option<String>,
}

/// DTO for updating an existing driver. All fields are optional.
///
/// `clear_vehicle` unassigns the vehicle (a `None` `vehicle_id` keeps it).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateDriver {
    pub name: Option<String>,
    pub rg: Option<String>,
    pub cnh: Option<String>,
    pub unit: Option<String>,
    pub operation: Option<String>,
    pub vehicle_id: Option<DbId>,
    #[serde(default)]
    pub clear_vehicle: bool,
    pub is_active: Option<bool>,
}
