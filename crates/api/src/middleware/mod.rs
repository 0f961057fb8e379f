//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- any valid Bearer token, staff or driver.
//! - [`rbac::RequireDriver`] -- a driver token.
//! - [`rbac::RequireStaff`] -- any staff role, with its unit scope.
//! - [`rbac::RequireFleetManager`] -- `admin` or `master`.
//! - [`rbac::RequireAdmin`] -- `admin` only.

pub mod auth;
pub mod rbac;
