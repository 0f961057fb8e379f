//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose subject kind
//! or role does not meet the requirement. Staff extractors also carry the
//! [`UnitScope`] that list queries and record checks must honour.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fleetcheck_core::error::CoreError;
use fleetcheck_core::roles::{Role, UnitScope};
use fleetcheck_core::types::DbId;

use super::auth::AuthUser;
use crate::auth::jwt::SubjectKind;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated staff member.
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub user_id: DbId,
    pub role: Role,
    pub unit: String,
    pub scope: UnitScope,
}

/// An authenticated driver.
#[derive(Debug, Clone)]
pub struct DriverUser {
    pub driver_id: DbId,
    pub unit: String,
}

async fn staff_from_parts(parts: &mut Parts, state: &AppState) -> Result<StaffUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if user.kind != SubjectKind::Staff {
        return Err(AppError::Core(CoreError::Forbidden(
            "Staff account required".into(),
        )));
    }
    let role = Role::parse(&user.role)
        .map_err(|_| AppError::Core(CoreError::Forbidden("Unknown staff role".into())))?;
    Ok(StaffUser {
        user_id: user.id,
        role,
        scope: UnitScope::for_role(role, &user.unit),
        unit: user.unit,
    })
}

/// Requires a driver token. Rejects staff tokens with 403.
pub struct RequireDriver(pub DriverUser);

impl FromRequestParts<AppState> for RequireDriver {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.kind != SubjectKind::Driver {
            return Err(AppError::Core(CoreError::Forbidden(
                "Driver account required".into(),
            )));
        }
        Ok(RequireDriver(DriverUser {
            driver_id: user.id,
            unit: user.unit,
        }))
    }
}

/// Requires any staff role (`admin`, `master`, `comum`).
pub struct RequireStaff(pub StaffUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequireStaff(staff_from_parts(parts, state).await?))
    }
}

/// Requires `admin` or `master`: staff allowed to change fleet records.
pub struct RequireFleetManager(pub StaffUser);

impl FromRequestParts<AppState> for RequireFleetManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let staff = staff_from_parts(parts, state).await?;
        if !staff.role.can_manage_fleet() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin or Master role required".into(),
            )));
        }
        Ok(RequireFleetManager(staff))
    }
}

/// Requires the `admin` role.
pub struct RequireAdmin(pub StaffUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let staff = staff_from_parts(parts, state).await?;
        if !staff.role.can_manage_users() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(staff))
    }
}
