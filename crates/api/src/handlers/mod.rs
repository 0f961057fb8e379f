//! Request handlers.
//!
//! Each submodule serves one resource. Handlers check access through the
//! extractors in [`crate::middleware::rbac`], validate input with
//! `fleetcheck_core`, delegate persistence to `fleetcheck_db` repositories and
//! map errors via [`crate::error::AppError`].

pub mod auth;
pub mod checklists;
pub mod contents;
pub mod dashboard;
pub mod documents;
pub mod driver_portal;
pub mod drivers;
pub mod imports;
pub mod pendencies;
pub mod plates;
pub mod reports;
pub mod submissions;
pub mod users;
pub mod vehicles;
