//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fleetcheck_core::error::CoreError;
use fleetcheck_core::types::DbId;

use crate::auth::jwt::{validate_token, SubjectKind};
use crate::error::AppError;
use crate::state::AppState;

/// Subject extracted from a JWT Bearer token in the `Authorization` header.
///
/// `id` is a staff user id or a driver id depending on `kind`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: DbId,
    pub kind: SubjectKind,
    pub role: String,
    pub unit: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            id: claims.sub,
            kind: claims.kind,
            role: claims.role,
            unit: claims.unit,
        })
    }
}
