//! Handlers for the `/auth` resource (staff and driver login, refresh, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use fleetcheck_core::credentials::{normalize_cpf, CPF_DIGITS, CREDENTIAL_DIGITS};
use fleetcheck_core::error::CoreError;
use fleetcheck_core::roles::ROLE_DRIVER;
use fleetcheck_core::types::DbId;
use fleetcheck_db::models::driver::Driver;
use fleetcheck_db::models::session::CreateSession;
use fleetcheck_db::repositories::{DriverRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{
    generate_access_token, generate_refresh_token, hash_refresh_token, SubjectKind,
};
use crate::auth::password::{verify_driver_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/driver/login`.
///
/// `login` is the six-digit credential or the full CPF.
#[derive(Debug, Deserialize)]
pub struct DriverLoginRequest {
    pub login: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub subject: SubjectInfo,
}

/// Public info about the authenticated staff user or driver.
#[derive(Debug, Serialize)]
pub struct SubjectInfo {
    pub id: DbId,
    pub kind: SubjectKind,
    pub name: String,
    pub role: String,
    pub unit: String,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid username or password".into(),
    ))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Staff login with username + password.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, input.username.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(username = %user.username, "Staff login rejected");
        return Err(invalid_credentials());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, role = %user.role, "Staff login");

    let subject = SubjectInfo {
        id: user.id,
        kind: SubjectKind::Staff,
        name: user.full_name,
        role: user.role,
        unit: user.unit,
    };
    Ok(Json(create_auth_response(&state, subject).await?))
}

/// POST /api/v1/auth/driver/login
///
/// Driver login. Without a stored password the password is the same
/// six-digit credential used as login. When several drivers share the
/// credential, the first (lowest id) whose password matches wins.
pub async fn driver_login(
    State(state): State<AppState>,
    Json(input): Json<DriverLoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let login = normalize_cpf(&input.login);

    let candidates: Vec<Driver> = match login.len() {
        CPF_DIGITS => match DriverRepo::find_by_cpf(&state.pool, &login).await? {
            Some(driver) if !driver.is_active => {
                return Err(AppError::Core(CoreError::Forbidden(
                    "Driver is deactivated".into(),
                )));
            }
            Some(driver) => vec![driver],
            None => Vec::new(),
        },
        CREDENTIAL_DIGITS => DriverRepo::find_login_candidates(&state.pool, &login).await?,
        _ => Vec::new(),
    };

    let mut matched = None;
    for driver in candidates {
        let stored_hash = driver.password_hash.as_deref();
        let ok = verify_driver_password(&input.password, &driver.cpf, stored_hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
        if ok {
            matched = Some(driver);
            break;
        }
    }
    let driver = matched.ok_or_else(invalid_credentials)?;

    DriverRepo::record_successful_login(&state.pool, driver.id).await?;
    tracing::info!(driver_id = driver.id, unit = %driver.unit, "Driver login");

    Ok(Json(create_auth_response(&state, driver_subject(driver)).await?))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens. The old
/// session is revoked (token rotation).
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid or expired refresh token".into(),
        ))
    };

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(invalid)?;

    // Only the request that flips the session to revoked may rotate it.
    if !SessionRepo::revoke(&state.pool, session.id).await? {
        return Err(invalid());
    }

    let gone = || AppError::Core(CoreError::Unauthorized("Account no longer exists".into()));
    let deactivated = || AppError::Core(CoreError::Forbidden("Account is deactivated".into()));

    let subject = match (session.user_id, session.driver_id) {
        (Some(user_id), _) => {
            let user = UserRepo::find_by_id(&state.pool, user_id)
                .await?
                .ok_or_else(gone)?;
            if !user.is_active {
                return Err(deactivated());
            }
            SubjectInfo {
                id: user.id,
                kind: SubjectKind::Staff,
                name: user.full_name,
                role: user.role,
                unit: user.unit,
            }
        }
        (None, Some(driver_id)) => {
            let driver = DriverRepo::find_by_id(&state.pool, driver_id)
                .await?
                .ok_or_else(gone)?;
            if !driver.is_active {
                return Err(deactivated());
            }
            driver_subject(driver)
        }
        (None, None) => return Err(gone()),
    };

    Ok(Json(create_auth_response(&state, subject).await?))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions of the caller. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = match auth_user.kind {
        SubjectKind::Staff => SessionRepo::revoke_all_for_user(&state.pool, auth_user.id).await?,
        SubjectKind::Driver => {
            SessionRepo::revoke_all_for_driver(&state.pool, auth_user.id).await?
        }
    };
    tracing::debug!(id = auth_user.id, kind = ?auth_user.kind, revoked, "Logout");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn driver_subject(driver: Driver) -> SubjectInfo {
    SubjectInfo {
        id: driver.id,
        kind: SubjectKind::Driver,
        name: driver.name,
        role: ROLE_DRIVER.to_string(),
        unit: driver.unit,
    }
}

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(state: &AppState, subject: SubjectInfo) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(
        subject.kind,
        subject.id,
        &subject.role,
        &subject.unit,
        &state.config.jwt,
    )
    .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    let (user_id, driver_id) = match subject.kind {
        SubjectKind::Staff => (Some(subject.id), None),
        SubjectKind::Driver => (None, Some(subject.id)),
    };
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id,
            driver_id,
            refresh_token_hash: refresh_hash,
            expires_at,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        subject,
    })
}
