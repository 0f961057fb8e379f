//! Plate entity model and DTOs.

use fleetcheck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plate {
    pub id: DbId,
    pub plate: String,
    pub kind: String,
    pub unit: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlate {
    pub plate: String,
    pub kind: String,
    pub unit: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlate {
    pub kind: Option<String>,
    pub unit: Option<String>,
}
