//! Handlers for `/admin/contents`: training content and its acknowledgment report.
//!
//! Content is shared by every unit. Create and update take a multipart form so
//! `file` resources can carry their upload in the same request:
//!
//! | field            | notes                                          |
//! |------------------|------------------------------------------------|
//! | `content_date`   | `YYYY-MM-DD`                                   |
//! | `subject`        |                                                |
//! | `question`       |                                                |
//! | `answer_options` | comma-separated, optional                      |
//! | `correct_answer` | must be one of the options when options exist  |
//! | `resource_kind`  | `video`, `link` or `file`                      |
//! | `resource_link`  | URL for `video` / `link`                       |
//! | `file`           | upload for `file`                              |

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use fleetcheck_core::content::{
    parse_answer_options, validate_question, validate_resource, RESOURCE_FILE,
};
use fleetcheck_core::error::CoreError;
use fleetcheck_core::types::DbId;
use fleetcheck_db::models::content::{
    AcknowledgmentReportRow, Content, CreateContent, UpdateContent,
};
use fleetcheck_db::repositories::{AcknowledgmentRepo, ContentRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireFleetManager, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::{read_multipart, remove_stored, save_upload, MultipartForm, CATEGORY_CONTENTS};

/// Response for `GET /admin/contents/{id}/acknowledgments`.
#[derive(Debug, Serialize)]
pub struct AcknowledgmentReport {
    pub content: Content,
    pub acknowledgments: Vec<AcknowledgmentReportRow>,
    pub correct_count: usize,
}

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| {
            AppError::BadRequest(format!("Invalid content_date '{raw}', expected YYYY-MM-DD"))
        })
}

fn find_or_404(content: Option<Content>, id: DbId) -> AppResult<Content> {
    content.ok_or(AppError::Core(CoreError::NotFound { entity: "Content", id }))
}

/// Store the form's upload when the resource is a file. Returns the stored path.
async fn store_resource_file(
    state: &AppState,
    form: &MultipartForm,
    kind: &str,
) -> AppResult<Option<String>> {
    if kind != RESOURCE_FILE {
        return Ok(None);
    }
    match &form.file {
        Some(file) => Ok(Some(
            save_upload(&state.config.upload_dir, CATEGORY_CONTENTS, file).await?,
        )),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/contents
pub async fn list_contents(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> AppResult<Json<DataResponse<Vec<Content>>>> {
    let data = ContentRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/contents/{id}
pub async fn get_content(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<Content>> {
    let content = find_or_404(ContentRepo::find_by_id(&state.pool, id).await?, id)?;
    Ok(Json(content))
}

/// POST /api/v1/admin/contents (multipart)
pub async fn create_content(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Content>)> {
    let form = read_multipart(multipart).await?;

    let content_date = parse_date(form.required("content_date")?)?;
    let subject = form.required("subject")?.to_string();
    let question = form.required("question")?.to_string();
    let correct_answer = form.required("correct_answer")?.to_string();
    let answer_options = parse_answer_options(form.text("answer_options").unwrap_or(""));
    let resource_kind = form.required("resource_kind")?.to_string();

    validate_question(&subject, &question, &answer_options, &correct_answer)?;

    let stored = store_resource_file(&state, &form, &resource_kind).await?;
    let resource_link = if resource_kind == RESOURCE_FILE {
        stored.clone()
    } else {
        form.text("resource_link").map(str::to_string)
    };
    if let Err(e) = validate_resource(&resource_kind, resource_link.as_deref()) {
        if let Some(path) = &stored {
            remove_stored(&state.config.upload_dir, path).await;
        }
        return Err(e.into());
    }
    if resource_kind == RESOURCE_FILE && resource_link.is_none() {
        return Err(AppError::BadRequest("A 'file' resource requires an upload".into()));
    }

    let input = CreateContent {
        content_date,
        subject,
        question,
        answer_options,
        correct_answer,
        resource_kind,
        resource_link,
    };
    let content = match ContentRepo::create(&state.pool, &input).await {
        Ok(content) => content,
        Err(e) => {
            if let Some(path) = &stored {
                remove_stored(&state.config.upload_dir, path).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!(content_id = content.id, created_by = staff.user_id, "Content created");
    Ok((StatusCode::CREATED, Json(content)))
}

/// PUT /api/v1/admin/contents/{id} (multipart)
///
/// Omitted fields keep their value. Uploading a new file replaces the stored
/// one; switching away from `file` removes it.
pub async fn update_content(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<Content>> {
    let existing = find_or_404(ContentRepo::find_by_id(&state.pool, id).await?, id)?;
    let form = read_multipart(multipart).await?;

    let content_date = form.text("content_date").map(parse_date).transpose()?;
    let answer_options = form.text("answer_options").map(parse_answer_options);
    let subject = form.text("subject").unwrap_or(&existing.subject);
    let question = form.text("question").unwrap_or(&existing.question);
    let correct_answer = form.text("correct_answer").unwrap_or(&existing.correct_answer);
    validate_question(
        subject,
        question,
        answer_options.as_deref().unwrap_or(&existing.answer_options),
        correct_answer,
    )?;

    let resource_kind = form
        .text("resource_kind")
        .unwrap_or(&existing.resource_kind)
        .to_string();
    let stored = store_resource_file(&state, &form, &resource_kind).await?;
    let resource_link = match (&stored, form.text("resource_link")) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(link)) if resource_kind != RESOURCE_FILE => Some(link.to_string()),
        (None, _) if resource_kind == existing.resource_kind => existing.resource_link.clone(),
        (None, _) => None,
    };
    if let Err(e) = validate_resource(&resource_kind, resource_link.as_deref()) {
        if let Some(path) = &stored {
            remove_stored(&state.config.upload_dir, path).await;
        }
        return Err(e.into());
    }
    if resource_kind == RESOURCE_FILE && resource_link.is_none() {
        return Err(AppError::BadRequest("A 'file' resource requires an upload".into()));
    }

    let update = UpdateContent {
        content_date,
        subject: Some(subject.to_string()),
        question: Some(question.to_string()),
        answer_options,
        correct_answer: Some(correct_answer.to_string()),
        resource_kind: Some(resource_kind),
        resource_link: resource_link.clone(),
    };
    let updated = ContentRepo::update(&state.pool, id, &update)
        .await
        .map_err(AppError::from)
        .and_then(|row| find_or_404(row, id));
    let content = match updated {
        Ok(content) => content,
        Err(e) => {
            if let Some(path) = &stored {
                remove_stored(&state.config.upload_dir, path).await;
            }
            return Err(e);
        }
    };

    let replaced_file = existing.resource_kind == RESOURCE_FILE
        && existing.resource_link.is_some()
        && existing.resource_link != resource_link;
    if replaced_file {
        if let Some(old) = &existing.resource_link {
            remove_stored(&state.config.upload_dir, old).await;
        }
    }

    tracing::info!(content_id = id, updated_by = staff.user_id, "Content updated");
    Ok(Json(content))
}

/// DELETE /api/v1/admin/contents/{id}
///
/// Removes the content together with its acknowledgments and stored file.
pub async fn delete_content(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_or_404(ContentRepo::find_by_id(&state.pool, id).await?, id)?;
    ContentRepo::delete(&state.pool, id).await?;
    if existing.resource_kind == RESOURCE_FILE {
        if let Some(path) = &existing.resource_link {
            remove_stored(&state.config.upload_dir, path).await;
        }
    }
    tracing::info!(content_id = id, deleted_by = staff.user_id, "Content deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/contents/{id}/acknowledgments
///
/// Who signed the content, with their answers. Non-admin staff only see
/// drivers of their unit.
pub async fn acknowledgment_report(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<AcknowledgmentReport>> {
    let content = find_or_404(ContentRepo::find_by_id(&state.pool, id).await?, id)?;
    let acknowledgments =
        AcknowledgmentRepo::report_for_content(&state.pool, id, staff.scope.filter()).await?;
    let correct_count = acknowledgments.iter().filter(|a| a.is_correct).count();
    Ok(Json(AcknowledgmentReport {
        content,
        acknowledgments,
        correct_count,
    }))
}
