//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod checklist;
pub mod content;
pub mod dashboard;
pub mod document;
pub mod driver;
pub mod pendency;
pub mod plate;
pub mod session;
pub mod submission;
pub mod user;
pub mod vehicle;
