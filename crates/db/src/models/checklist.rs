//! Checklist template and item models.

use fleetcheck_core::checklist::TreeItem;
use fleetcheck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Checklist {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub version: i32,
    pub kind: String,
    pub unit: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateChecklist {
    pub name: String,
    pub code: String,
    pub version: Option<i32>,
    pub kind: String,
    pub unit: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateChecklist {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChecklistItem {
    pub id: DbId,
    pub checklist_id: DbId,
    pub parent_id: Option<DbId>,
    pub text: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TreeItem for ChecklistItem {
    fn id(&self) -> DbId {
        self.id
    }

    fn parent_id(&self) -> Option<DbId> {
        self.parent_id
    }

    fn sort_order(&self) -> i32 {
        self.sort_order
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateChecklistItem {
    pub parent_id: Option<DbId>,
    pub text: String,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateChecklistItem {
    pub text: Option<String>,
    pub sort_order: Option<i32>,
}
