//! Vehicle set (conjunto) model and DTOs.

use fleetcheck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A vehicle row joined with its plate identifiers.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vehicle {
    pub id: DbId,
    pub name: String,
    pub tractor_plate_id: DbId,
    pub tractor_plate: String,
    pub trailer1_plate_id: Option<DbId>,
    pub trailer1_plate: Option<String>,
    pub trailer2_plate_id: Option<DbId>,
    pub trailer2_plate: Option<String>,
    pub unit: String,
    pub operation: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVehicle {
    pub name: String,
    pub tractor_plate_id: DbId,
    pub trailer1_plate_id: Option<DbId>,
    pub trailer2_plate_id: Option<DbId>,
    pub unit: String,
    pub operation: Option<String>,
}

/// Plate slots are replaced as a whole: the handler resolves the final
/// composition and validates it before calling the repository.
#[derive(Debug, Clone)]
pub struct UpdateVehicle {
    pub name: String,
    pub tractor_plate_id: DbId,
    pub trailer1_plate_id: Option<DbId>,
    pub trailer2_plate_id: Option<DbId>,
    pub unit: String,
    pub operation: Option<String>,
}
