//! Refresh-token session model and DTOs.

use fleetcheck_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `user_sessions` table.
///
/// Exactly one of `user_id` (staff) and `driver_id` is set.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub driver_id: Option<DbId>,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new session.
pub struct CreateSession {
    pub user_id: Option<DbId>,
    pub driver_id: Option<DbId>,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
