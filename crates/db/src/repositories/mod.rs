//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. List methods that honour
//! unit visibility take `unit: Option<&str>`; `None` means every unit.

pub mod acknowledgment_repo;
pub mod checklist_item_repo;
pub mod checklist_repo;
pub mod content_repo;
pub mod document_repo;
pub mod driver_repo;
pub mod pendency_repo;
pub mod plate_repo;
pub mod report_repo;
pub mod session_repo;
pub mod submission_repo;
pub mod user_repo;
pub mod vehicle_repo;

pub use acknowledgment_repo::AcknowledgmentRepo;
pub use checklist_item_repo::ChecklistItemRepo;
pub use checklist_repo::ChecklistRepo;
pub use content_repo::ContentRepo;
pub use document_repo::DocumentRepo;
pub use driver_repo::DriverRepo;
pub use pendency_repo::PendencyRepo;
pub use plate_repo::PlateRepo;
pub use report_repo::ReportRepo;
pub use session_repo::SessionRepo;
pub use submission_repo::SubmissionRepo;
pub use user_repo::UserRepo;
pub use vehicle_repo::VehicleRepo;
