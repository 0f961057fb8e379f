//! Staff user entity model and DTOs.

use fleetcheck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub full_name: String,
    pub cpf: Option<String>,
    pub sector: Option<String>,
    pub unit: String,
    pub role: String,
    pub password_hash: String,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub full_name: String,
    pub cpf: Option<String>,
    pub sector: Option<String>,
    pub unit: String,
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            full_name: u.full_name,
            cpf: u.cpf,
            sector: u.sector,
            unit: u.unit,
            role: u.role,
            is_active: u.is_active,
            last_login_at: u.last_login_at,
            created_at: u.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub full_name: String,
    pub cpf: Option<String>,
    pub sector: Option<String>,
    pub unit: String,
    pub role: String,
    pub password_hash: String,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub cpf: Option<String>,
    pub sector: Option<String>,
    pub unit: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}
