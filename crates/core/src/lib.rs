//! Domain rules for the fleet-compliance service.
//!
//! Everything in this crate is pure: no I/O, no database access. The `db`
//! and `api` crates call into these modules to validate input and shape
//! results before persisting or returning them.

pub mod checklist;
pub mod content;
pub mod credentials;
pub mod error;
pub mod fleet;
pub mod import;
pub mod paging;
pub mod pendency;
pub mod report;
pub mod roles;
pub mod signature;
pub mod types;
