//! Handlers for `/admin/documents` (fixed documents drivers can consult).
//!
//! A document with no unit is published to every unit. Only admins may
//! publish globally; other managers publish to their own unit.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use fleetcheck_core::credentials::require_text;
use fleetcheck_core::error::CoreError;
use fleetcheck_core::roles::UnitScope;
use fleetcheck_core::types::DbId;
use fleetcheck_db::models::document::{CreateDocument, FixedDocument, UpdateDocument};
use fleetcheck_db::repositories::DocumentRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireFleetManager, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::{read_multipart, remove_stored, save_upload, CATEGORY_DOCUMENTS};

async fn find_in_scope(state: &AppState, scope: &UnitScope, id: DbId) -> AppResult<FixedDocument> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id,
        }))?;
    if let Some(unit) = &document.unit {
        scope.ensure(unit)?;
    }
    Ok(document)
}

/// Global documents are readable by everyone but only admins change them.
fn ensure_writable(scope: &UnitScope, document: &FixedDocument) -> AppResult<()> {
    match (&document.unit, scope) {
        (None, UnitScope::Unit(_)) => Err(AppError::Core(CoreError::Forbidden(
            "Only admins can change documents published to every unit".into(),
        ))),
        _ => Ok(()),
    }
}

/// GET /api/v1/admin/documents
pub async fn list_documents(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
) -> AppResult<Json<DataResponse<Vec<FixedDocument>>>> {
    let data = DocumentRepo::list(&state.pool, staff.scope.filter()).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<FixedDocument>> {
    Ok(Json(find_in_scope(&state, &staff.scope, id).await?))
}

/// POST /api/v1/admin/documents (multipart: `title`, `description`,
/// `category`, `unit`, `file`)
pub async fn create_document(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<FixedDocument>)> {
    let form = read_multipart(multipart).await?;
    let title = form.required("title")?.to_string();
    require_text("title", &title)?;
    let file = form
        .file
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Missing 'file' part".into()))?;

    let unit = match (&staff.scope, form.text("unit")) {
        (UnitScope::All, None) => None,
        (scope, requested) => Some(scope.resolve_unit(requested)?),
    };

    let file_path = save_upload(&state.config.upload_dir, CATEGORY_DOCUMENTS, file).await?;
    let input = CreateDocument {
        title,
        description: form.text("description").map(str::to_string),
        category: form.text("category").map(str::to_string),
        file_path: file_path.clone(),
        unit,
    };
    let document = match DocumentRepo::create(&state.pool, &input).await {
        Ok(document) => document,
        Err(e) => {
            remove_stored(&state.config.upload_dir, &file_path).await;
            return Err(e.into());
        }
    };

    tracing::info!(document_id = document.id, unit = ?document.unit, "Document published");
    Ok((StatusCode::CREATED, Json(document)))
}

/// PUT /api/v1/admin/documents/{id}
///
/// Metadata only; upload a new document to replace the file.
pub async fn update_document(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDocument>,
) -> AppResult<Json<FixedDocument>> {
    let existing = find_in_scope(&state, &staff.scope, id).await?;
    ensure_writable(&staff.scope, &existing)?;
    if let Some(title) = &input.title {
        require_text("title", title)?;
    }
    let document = DocumentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id,
        }))?;
    Ok(Json(document))
}

/// DELETE /api/v1/admin/documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    RequireFleetManager(staff): RequireFleetManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_in_scope(&state, &staff.scope, id).await?;
    ensure_writable(&staff.scope, &existing)?;
    if let Some(path) = DocumentRepo::delete(&state.pool, id).await? {
        remove_stored(&state.config.upload_dir, &path).await;
    }
    tracing::info!(document_id = id, deleted_by = staff.user_id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}
