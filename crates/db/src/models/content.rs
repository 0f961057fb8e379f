//! Training content and acknowledgment models.

use chrono::NaiveDate;
use fleetcheck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Content {
    pub id: DbId,
    pub content_date: NaiveDate,
    pub subject: String,
    pub question: String,
    pub answer_options: Vec<String>,
    pub correct_answer: String,
    pub resource_kind: String,
    pub resource_link: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Content listing entry for a driver, flagged when already acknowledged.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DriverContent {
    pub id: DbId,
    pub content_date: NaiveDate,
    pub subject: String,
    pub resource_kind: String,
    pub acknowledged: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContent {
    pub content_date: NaiveDate,
    pub subject: String,
    pub question: String,
    pub answer_options: Vec<String>,
    pub correct_answer: String,
    pub resource_kind: String,
    pub resource_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateContent {
    pub content_date: Option<NaiveDate>,
    pub subject: Option<String>,
    pub question: Option<String>,
    pub answer_options: Option<Vec<String>>,
    pub correct_answer: Option<String>,
    pub resource_kind: Option<String>,
    pub resource_link: Option<String>,
}

/// A driver's signed acknowledgment of a content item.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Acknowledgment {
    pub id: DbId,
    pub driver_id: DbId,
    pub content_id: DbId,
    pub answer: Option<String>,
    pub is_correct: bool,
    pub read_time_secs: i32,
    pub signature_path: Option<String>,
    pub acknowledged_at: Timestamp,
}

pub struct CreateAcknowledgment {
    pub driver_id: DbId,
    pub content_id: DbId,
    pub answer: Option<String>,
    pub is_correct: bool,
    pub read_time_secs: i32,
    pub signature_path: Option<String>,
}

/// Row of the per-content acknowledgment report.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AcknowledgmentReportRow {
    pub acknowledgment_id: DbId,
    pub driver_id: DbId,
    pub driver_name: String,
    pub driver_cpf: String,
    pub driver_unit: String,
    pub answer: Option<String>,
    pub is_correct: bool,
    pub read_time_secs: i32,
    pub signature_path: Option<String>,
    pub acknowledged_at: Timestamp,
}
