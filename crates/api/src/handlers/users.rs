//! Handlers for `/admin/users` (staff accounts).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fleetcheck_core::credentials::{require_text, validate_cpf};
use fleetcheck_core::error::CoreError;
use fleetcheck_core::roles::Role;
use fleetcheck_core::types::DbId;
use fleetcheck_db::models::user::{CreateUser, UpdateUser, UserResponse};
use fleetcheck_db::repositories::{SessionRepo, UserRepo};
use serde::Deserialize;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub full_name: String,
    pub cpf: Option<String>,
    pub sector: Option<String>,
    pub unit: String,
    pub role: String,
    pub password: String,
}

/// Request body for `POST /admin/users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

fn hash_checked(password: &str) -> AppResult<String> {
    validate_password_strength(password, MIN_PASSWORD_LENGTH)?;
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool, None).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(user.into()))
}

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    require_text("username", &input.username)?;
    require_text("full_name", &input.full_name)?;
    require_text("unit", &input.unit)?;
    let role = Role::parse(&input.role)?;
    let cpf = input.cpf.as_deref().map(validate_cpf).transpose()?;
    let password_hash = hash_checked(&input.password)?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username.trim().to_string(),
            full_name: input.full_name.trim().to_string(),
            cpf,
            sector: input.sector,
            unit: input.unit.trim().to_string(),
            role: role.as_str().to_string(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        role = %user.role,
        created_by = admin.user_id,
        "User created"
    );
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PUT /api/v1/admin/users/{id}
///
/// Admins cannot demote or deactivate themselves. Deactivation revokes the
/// user's sessions.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    let role = input.role.as_deref().map(Role::parse).transpose()?;
    let demotes = role.is_some_and(|r| r != Role::Admin);
    if id == admin.user_id && (demotes || input.is_active == Some(false)) {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot demote or deactivate your own account".into(),
        )));
    }
    if let Some(full_name) = &input.full_name {
        require_text("full_name", full_name)?;
    }
    if let Some(unit) = &input.unit {
        require_text("unit", unit)?;
    }
    let cpf = input.cpf.as_deref().map(validate_cpf).transpose()?;

    let update = UpdateUser { cpf, ..input };
    let user = UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| not_found(id))?;

    if !user.is_active {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }
    Ok(Json(user.into()))
}

/// POST /api/v1/admin/users/{id}/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    let password_hash = hash_checked(&input.new_password)?;
    if !UserRepo::update_password(&state.pool, id, &password_hash).await? {
        return Err(not_found(id));
    }
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(user_id = id, revoked, reset_by = admin.user_id, "User password reset");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot delete your own account".into(),
        )));
    }
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = id, deleted_by = admin.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
