use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
}

/// GET /health -- service and database health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match fleetcheck_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// Mount health check routes (root level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
