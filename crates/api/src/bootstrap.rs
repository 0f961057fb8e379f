//! First-run setup: create the initial admin account.

use fleetcheck_core::roles::ROLE_ADMIN;
use fleetcheck_db::models::user::CreateUser;
use fleetcheck_db::repositories::UserRepo;
use fleetcheck_db::DbPool;

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Unit assigned to the bootstrap admin.
pub const BOOTSTRAP_UNIT: &str = "Matriz";

/// Create the configured admin when the `users` table is empty.
///
/// Returns `true` if an account was created. Existing installations are
/// never touched, so rotating `ADMIN_PASSWORD` has no effect after first run.
pub async fn ensure_admin(pool: &DbPool, admin: Option<&BootstrapAdmin>) -> AppResult<bool> {
    let Some(admin) = admin else {
        return Ok(false);
    };
    if UserRepo::count(pool).await? > 0 {
        return Ok(false);
    }

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: admin.username.clone(),
            full_name: admin.username.clone(),
            cpf: None,
            sector: Some("TI".to_string()),
            unit: BOOTSTRAP_UNIT.to_string(),
            role: ROLE_ADMIN.to_string(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Bootstrap admin created");
    Ok(true)
}
