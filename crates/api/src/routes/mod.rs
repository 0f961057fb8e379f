pub mod admin;
pub mod auth;
pub mod driver;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                     staff login (public)
/// /auth/driver/login              driver login (public)
/// /auth/refresh                   token refresh (public)
/// /auth/logout                    logout (requires auth)
///
/// /driver/...                     driver portal (driver token)
/// /admin/...                      back office (staff token)
/// ```
///
/// See [`driver::router`] and [`admin::router`] for the full tables.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/driver", driver::router())
        .nest("/admin", admin::router())
}
