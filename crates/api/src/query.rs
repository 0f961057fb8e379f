//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped in the repository layer via `clamp_limit` / `clamp_offset`.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for list endpoints that hide deactivated rows by default.
#[derive(Debug, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}
