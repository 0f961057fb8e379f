//! Fixed document model and DTOs.

use fleetcheck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FixedDocument {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub file_path: String,
    /// `None` publishes the document to every unit.
    pub unit: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub struct CreateDocument {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub file_path: String,
    pub unit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDocument {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}
