//! Route definitions for the `/admin` back office.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{
    checklists, contents, dashboard, documents, drivers, imports, pendencies, plates, reports,
    submissions, users, vehicles,
};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// Reads need any staff role; writes need `admin` or `master` except
/// `/users` (admin only) and pendency transitions (any staff). Enforced by
/// handler extractors.
///
/// ```text
/// GET    /dashboard                                 -> get_dashboard
///
/// GET    /drivers                                   -> list_drivers
/// POST   /drivers                                   -> create_driver
/// GET    /drivers/{id}                              -> get_driver
/// PUT    /drivers/{id}                              -> update_driver
/// DELETE /drivers/{id}                              -> delete_driver
/// POST   /drivers/{id}/password                     -> set_driver_password
///
/// GET    /plates                                    -> list_plates
/// POST   /plates                                    -> create_plate
/// GET    /plates/{id}                               -> get_plate
/// PUT    /plates/{id}                               -> update_plate
/// DELETE /plates/{id}                               -> delete_plate
///
/// GET    /vehicles                                  -> list_vehicles
/// POST   /vehicles                                  -> create_vehicle
/// GET    /vehicles/{id}                             -> get_vehicle
/// PUT    /vehicles/{id}                             -> update_vehicle
/// DELETE /vehicles/{id}                             -> delete_vehicle
///
/// GET    /contents                                  -> list_contents
/// POST   /contents                                  -> create_content (multipart)
/// GET    /contents/{id}                             -> get_content
/// PUT    /contents/{id}                             -> update_content (multipart)
/// DELETE /contents/{id}                             -> delete_content
/// GET    /contents/{id}/acknowledgments             -> acknowledgment_report
///
/// GET    /checklists                                -> list_checklists
/// POST   /checklists                                -> create_checklist
/// GET    /checklists/{id}                           -> get_checklist
/// PUT    /checklists/{id}                           -> update_checklist
/// DELETE /checklists/{id}                           -> delete_checklist
/// POST   /checklists/{id}/items                     -> create_item
/// PUT    /checklists/{id}/items/{item_id}           -> update_item
/// DELETE /checklists/{id}/items/{item_id}           -> delete_item
///
/// GET    /submissions                               -> list_submissions
/// GET    /submissions/{id}                          -> get_submission
///
/// GET    /pendencies                                -> list_pendencies
/// GET    /pendencies/{id}                           -> get_pendency
/// POST   /pendencies/{id}/transition                -> transition_pendency
///
/// GET    /documents                                 -> list_documents
/// POST   /documents                                 -> create_document (multipart)
/// GET    /documents/{id}                            -> get_document
/// PUT    /documents/{id}                            -> update_document
/// DELETE /documents/{id}                            -> delete_document
///
/// GET    /users                                     -> list_users
/// POST   /users                                     -> create_user
/// GET    /users/{id}                                -> get_user
/// PUT    /users/{id}                                -> update_user
/// DELETE /users/{id}                                -> delete_user
/// POST   /users/{id}/reset-password                 -> reset_password
///
/// GET    /reports/submissions                       -> consolidated_report
/// GET    /reports/submissions/pdf                   -> consolidated_report_pdf
///
/// POST   /imports/drivers                           -> import_drivers (multipart)
/// POST   /imports/plates                            -> import_plates (multipart)
/// POST   /imports/vehicles                          -> import_vehicles (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        // Drivers
        .route("/drivers", get(drivers::list_drivers).post(drivers::create_driver))
        .route(
            "/drivers/{id}",
            get(drivers::get_driver)
                .put(drivers::update_driver)
                .delete(drivers::delete_driver),
        )
        .route("/drivers/{id}/password", post(drivers::set_driver_password))
        // Plates
        .route("/plates", get(plates::list_plates).post(plates::create_plate))
        .route(
            "/plates/{id}",
            get(plates::get_plate)
                .put(plates::update_plate)
                .delete(plates::delete_plate),
        )
        // Vehicle sets
        .route(
            "/vehicles",
            get(vehicles::list_vehicles).post(vehicles::create_vehicle),
        )
        .route(
            "/vehicles/{id}",
            get(vehicles::get_vehicle)
                .put(vehicles::update_vehicle)
                .delete(vehicles::delete_vehicle),
        )
        // Content
        .route(
            "/contents",
            get(contents::list_contents).post(contents::create_content),
        )
        .route(
            "/contents/{id}",
            get(contents::get_content)
                .put(contents::update_content)
                .delete(contents::delete_content),
        )
        .route(
            "/contents/{id}/acknowledgments",
            get(contents::acknowledgment_report),
        )
        // Checklists
        .route(
            "/checklists",
            get(checklists::list_checklists).post(checklists::create_checklist),
        )
        .route(
            "/checklists/{id}",
            get(checklists::get_checklist)
                .put(checklists::update_checklist)
                .delete(checklists::delete_checklist),
        )
        .route("/checklists/{id}/items", post(checklists::create_item))
        .route(
            "/checklists/{id}/items/{item_id}",
            put(checklists::update_item).delete(checklists::delete_item),
        )
        // Submissions and pendencies
        .route("/submissions", get(submissions::list_submissions))
        .route("/submissions/{id}", get(submissions::get_submission))
        .route("/pendencies", get(pendencies::list_pendencies))
        .route("/pendencies/{id}", get(pendencies::get_pendency))
        .route(
            "/pendencies/{id}/transition",
            post(pendencies::transition_pendency),
        )
        // Documents
        .route(
            "/documents",
            get(documents::list_documents).post(documents::create_document),
        )
        .route(
            "/documents/{id}",
            get(documents::get_document)
                .put(documents::update_document)
                .delete(documents::delete_document),
        )
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{id}/reset-password", post(users::reset_password))
        // Reports
        .route("/reports/submissions", get(reports::consolidated_report))
        .route(
            "/reports/submissions/pdf",
            get(reports::consolidated_report_pdf),
        )
        // Imports
        .route("/imports/drivers", post(imports::import_drivers))
        .route("/imports/plates", post(imports::import_plates))
        .route("/imports/vehicles", post(imports::import_vehicles))
}
