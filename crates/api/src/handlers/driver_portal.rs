//! Handlers for the driver portal (`/driver`).
//!
//! Every handler requires a driver token via [`RequireDriver`]. The driver row
//! is reloaded on each request so deactivation and vehicle reassignment take
//! effect immediately.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use fleetcheck_core::checklist::{build_tree, validate_answers, ItemNode};
use fleetcheck_core::content::{answer_is_correct, youtube_id, RESOURCE_VIDEO};
use fleetcheck_core::error::CoreError;
use fleetcheck_core::signature::decode_signature;
use fleetcheck_core::types::DbId;
use fleetcheck_db::models::checklist::{Checklist, ChecklistItem};
use fleetcheck_db::models::content::{Acknowledgment, CreateAcknowledgment, DriverContent};
use fleetcheck_db::models::document::FixedDocument;
use fleetcheck_db::models::driver::Driver;
use fleetcheck_db::models::submission::{
    CreateSubmission, NewResponse, Submission, SubmissionOutcome,
};
use fleetcheck_db::models::vehicle::Vehicle;
use fleetcheck_db::repositories::{
    AcknowledgmentRepo, ChecklistItemRepo, ChecklistRepo, ContentRepo, DocumentRepo, DriverRepo,
    PendencyRepo, SubmissionRepo, VehicleRepo,
};
use serde::{Deserialize, Serialize};

use crate::auth::password::{
    hash_password, validate_password_strength, verify_driver_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireDriver;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::{remove_stored, save_signature};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DriverProfile {
    pub driver: Driver,
    pub vehicle: Option<Vehicle>,
}

/// Request body for `PUT /driver/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Content as shown to a driver: everything except the correct answer.
#[derive(Debug, Serialize)]
pub struct ContentView {
    pub id: DbId,
    pub content_date: NaiveDate,
    pub subject: String,
    pub question: String,
    pub answer_options: Vec<String>,
    pub resource_kind: String,
    pub resource_link: Option<String>,
    /// Embeddable id for video resources hosted on YouTube.
    pub video_id: Option<String>,
    pub acknowledgment: Option<Acknowledgment>,
}

/// Request body for `POST /driver/contents/{id}/acknowledge`.
#[derive(Debug, Deserialize)]
pub struct AcknowledgeRequest {
    pub answer: Option<String>,
    #[serde(default)]
    pub read_time_secs: i32,
    /// `data:image/png;base64,...` drawn on the signature pad.
    pub signature: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChecklistTree {
    pub checklist: Checklist,
    pub items: Vec<ItemNode<ChecklistItem>>,
    /// Items with an open or in-progress pendency on the driver's vehicle.
    pub pending_item_ids: Vec<DbId>,
    pub vehicle: Option<Vehicle>,
}

/// Request body for `POST /driver/checklists/{id}/submissions`.
#[derive(Debug, Deserialize)]
pub struct SubmitChecklistRequest {
    pub responses: Vec<NewResponse>,
    pub observations: Option<String>,
    pub location: Option<String>,
    pub odometer_km: Option<i64>,
    pub driver_signature: Option<String>,
    pub inspector_signature: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_driver(state: &AppState, driver_id: DbId) -> AppResult<Driver> {
    let driver = DriverRepo::find_by_id(&state.pool, driver_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Driver",
            id: driver_id,
        }))?;
    if !driver.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Driver is deactivated".into(),
        )));
    }
    Ok(driver)
}

/// Load a checklist the driver may fill: active and of the driver's unit.
async fn load_driver_checklist(
    state: &AppState,
    driver: &Driver,
    checklist_id: DbId,
) -> AppResult<Checklist> {
    let checklist = ChecklistRepo::find_by_id(&state.pool, checklist_id)
        .await?
        .filter(|c| c.is_active && c.unit == driver.unit)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Checklist",
            id: checklist_id,
        }))?;
    Ok(checklist)
}

async fn store_signature(state: &AppState, data_url: Option<&str>) -> AppResult<Option<String>> {
    match data_url.map(str::trim).filter(|s| !s.is_empty()) {
        Some(data_url) => {
            let signature = decode_signature(data_url)?;
            let path = save_signature(&state.config.upload_dir, &signature.png).await?;
            Ok(Some(path))
        }
        None => Ok(None),
    }
}

async fn discard(state: &AppState, paths: &[&Option<String>]) {
    for path in paths.iter().filter_map(|p| p.as_deref()) {
        remove_stored(&state.config.upload_dir, path).await;
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// GET /api/v1/driver/me
pub async fn me(
    State(state): State<AppState>,
    RequireDriver(auth): RequireDriver,
) -> AppResult<Json<DriverProfile>> {
    let driver = load_driver(&state, auth.driver_id).await?;
    let vehicle = match driver.vehicle_id {
        Some(id) => VehicleRepo::find_by_id(&state.pool, id).await?,
        None => None,
    };
    Ok(Json(DriverProfile { driver, vehicle }))
}

/// PUT /api/v1/driver/password
///
/// Replace the CPF-derived credential (or a previous password) with a
/// password of the driver's choice.
pub async fn change_password(
    State(state): State<AppState>,
    RequireDriver(auth): RequireDriver,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let driver = load_driver(&state, auth.driver_id).await?;

    let current_ok = verify_driver_password(
        &input.current_password,
        &driver.cpf,
        driver.password_hash.as_deref(),
    )
    .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_ok {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Current password is incorrect".into(),
        )));
    }

    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)?;
    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    DriverRepo::update_password(&state.pool, driver.id, Some(&hashed)).await?;

    tracing::info!(driver_id = driver.id, "Driver changed password");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Content and acknowledgments
// ---------------------------------------------------------------------------

/// GET /api/v1/driver/contents
///
/// All content, newest first, each flagged when the driver already signed it.
pub async fn list_contents(
    State(state): State<AppState>,
    RequireDriver(auth): RequireDriver,
) -> AppResult<Json<DataResponse<Vec<DriverContent>>>> {
    let driver = load_driver(&state, auth.driver_id).await?;
    let data = ContentRepo::list_for_driver(&state.pool, driver.id).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/driver/contents/{id}
pub async fn get_content(
    State(state): State<AppState>,
    RequireDriver(auth): RequireDriver,
    Path(id): Path<DbId>,
) -> AppResult<Json<ContentView>> {
    let driver = load_driver(&state, auth.driver_id).await?;
    let content = ContentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Content", id }))?;
    let acknowledgment = AcknowledgmentRepo::find(&state.pool, driver.id, id).await?;

    let video_id = match (content.resource_kind.as_str(), content.resource_link.as_deref()) {
        (RESOURCE_VIDEO, Some(link)) => Some(youtube_id(link)),
        _ => None,
    };

    Ok(Json(ContentView {
        id: content.id,
        content_date: content.content_date,
        subject: content.subject,
        question: content.question,
        answer_options: content.answer_options,
        resource_kind: content.resource_kind,
        resource_link: content.resource_link,
        video_id,
        acknowledgment,
    }))
}

/// POST /api/v1/driver/contents/{id}/acknowledge
///
/// Record the driver's answer, reading time and optional signature. A
/// content item can be acknowledged once; a second attempt is a 409.
pub async fn acknowledge(
    State(state): State<AppState>,
    RequireDriver(auth): RequireDriver,
    Path(id): Path<DbId>,
    Json(input): Json<AcknowledgeRequest>,
) -> AppResult<(StatusCode, Json<Acknowledgment>)> {
    let driver = load_driver(&state, auth.driver_id).await?;
    let content = ContentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Content", id }))?;

    if AcknowledgmentRepo::find(&state.pool, driver.id, id).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Content already acknowledged".into(),
        )));
    }
    if input.read_time_secs < 0 {
        return Err(AppError::Core(CoreError::Validation(
            "read_time_secs must not be negative".into(),
        )));
    }

    let answer = input
        .answer
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());
    let is_correct = answer
        .as_deref()
        .map(|a| answer_is_correct(a, &content.correct_answer))
        .unwrap_or(false);

    let signature_path = store_signature(&state, input.signature.as_deref()).await?;

    let created = AcknowledgmentRepo::create(
        &state.pool,
        &CreateAcknowledgment {
            driver_id: driver.id,
            content_id: id,
            answer,
            is_correct,
            read_time_secs: input.read_time_secs,
            signature_path: signature_path.clone(),
        },
    )
    .await;

    match created {
        Ok(ack) => {
            tracing::info!(
                driver_id = driver.id,
                content_id = id,
                is_correct,
                signed = ack.signature_path.is_some(),
                "Content acknowledged"
            );
            Ok((StatusCode::CREATED, Json(ack)))
        }
        Err(e) => {
            discard(&state, &[&signature_path]).await;
            Err(e.into())
        }
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// GET /api/v1/driver/documents
///
/// Documents of the driver's unit plus those published to every unit.
pub async fn list_documents(
    State(state): State<AppState>,
    RequireDriver(auth): RequireDriver,
) -> AppResult<Json<DataResponse<Vec<FixedDocument>>>> {
    let driver = load_driver(&state, auth.driver_id).await?;
    let data = DocumentRepo::list(&state.pool, Some(&driver.unit)).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Checklists
// ---------------------------------------------------------------------------

/// GET /api/v1/driver/checklists
///
/// Active checklists of the driver's unit.
pub async fn list_checklists(
    State(state): State<AppState>,
    RequireDriver(auth): RequireDriver,
) -> AppResult<Json<DataResponse<Vec<Checklist>>>> {
    let driver = load_driver(&state, auth.driver_id).await?;
    let data = ChecklistRepo::list(&state.pool, Some(&driver.unit), true).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/driver/checklists/{id}
///
/// The item tree to fill, with the items already pending on the driver's vehicle.
pub async fn get_checklist(
    State(state): State<AppState>,
    RequireDriver(auth): RequireDriver,
    Path(id): Path<DbId>,
) -> AppResult<Json<ChecklistTree>> {
    let driver = load_driver(&state, auth.driver_id).await?;
    let checklist = load_driver_checklist(&state, &driver, id).await?;
    let items = ChecklistItemRepo::list_by_checklist(&state.pool, id).await?;
    let tree = build_tree(&items)?;

    let (vehicle, pending_item_ids) = match driver.vehicle_id {
        Some(vehicle_id) => (
            VehicleRepo::find_by_id(&state.pool, vehicle_id).await?,
            PendencyRepo::active_item_ids(&state.pool, vehicle_id).await?,
        ),
        None => (None, Vec::new()),
    };

    Ok(Json(ChecklistTree {
        checklist,
        items: tree,
        pending_item_ids,
        vehicle,
    }))
}

/// POST /api/v1/driver/checklists/{id}/submissions
///
/// Submit a filled checklist for the driver's assigned vehicle. Every leaf
/// item must be answered exactly once. Non-conforming answers open a
/// pendency unless the item already has an active one on the vehicle.
pub async fn submit_checklist(
    State(state): State<AppState>,
    RequireDriver(auth): RequireDriver,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitChecklistRequest>,
) -> AppResult<(StatusCode, Json<SubmissionOutcome>)> {
    let driver = load_driver(&state, auth.driver_id).await?;
    let checklist = load_driver_checklist(&state, &driver, id).await?;

    let vehicle_id = driver.vehicle_id.ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "No vehicle is assigned to this driver".into(),
        ))
    })?;

    if input.odometer_km.is_some_and(|km| km < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "odometer_km must not be negative".into(),
        )));
    }

    let items = ChecklistItemRepo::list_by_checklist(&state.pool, checklist.id).await?;
    let answered: Vec<DbId> = input.responses.iter().map(|r| r.item_id).collect();
    validate_answers(&items, &answered)?;

    let driver_signature_path = store_signature(&state, input.driver_signature.as_deref()).await?;
    let inspector_signature_path =
        match store_signature(&state, input.inspector_signature.as_deref()).await {
            Ok(path) => path,
            Err(e) => {
                discard(&state, &[&driver_signature_path]).await;
                return Err(e);
            }
        };

    let trimmed = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let responses: Vec<NewResponse> = input
        .responses
        .into_iter()
        .map(|r| NewResponse {
            note: trimmed(r.note),
            ..r
        })
        .collect();

    let create = CreateSubmission {
        checklist_id: checklist.id,
        driver_id: driver.id,
        vehicle_id,
        observations: trimmed(input.observations),
        location: trimmed(input.location),
        odometer_km: input.odometer_km,
        driver_signature_path: driver_signature_path.clone(),
        inspector_signature_path: inspector_signature_path.clone(),
    };

    match SubmissionRepo::create_with_responses(&state.pool, &create, &responses).await {
        Ok(outcome) => {
            tracing::info!(
                submission_id = outcome.submission_id,
                driver_id = driver.id,
                vehicle_id,
                checklist_id = checklist.id,
                opened_pendencies = outcome.opened_pendency_ids.len(),
                "Checklist submitted"
            );
            Ok((StatusCode::CREATED, Json(outcome)))
        }
        Err(e) => {
            discard(&state, &[&driver_signature_path, &inspector_signature_path]).await;
            Err(e.into())
        }
    }
}

/// GET /api/v1/driver/submissions
///
/// The driver's own submission history, newest first.
pub async fn list_submissions(
    State(state): State<AppState>,
    RequireDriver(auth): RequireDriver,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Submission>>>> {
    let driver = load_driver(&state, auth.driver_id).await?;
    let data = SubmissionRepo::list_for_driver(&state.pool, driver.id, params.limit).await?;
    Ok(Json(DataResponse { data }))
}
