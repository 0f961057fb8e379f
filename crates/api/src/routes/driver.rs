//! Route definitions for the driver portal.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::driver_portal;
use crate::state::AppState;

/// Routes mounted at `/driver`. Every route requires a driver token.
///
/// ```text
/// GET  /me                               -> me
/// PUT  /password                         -> change_password
/// GET  /contents                         -> list_contents
/// GET  /contents/{id}                    -> get_content
/// POST /contents/{id}/acknowledge        -> acknowledge
/// GET  /documents                        -> list_documents
/// GET  /checklists                       -> list_checklists
/// GET  /checklists/{id}                  -> get_checklist
/// POST /checklists/{id}/submissions      -> submit_checklist
/// GET  /submissions                      -> list_submissions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(driver_portal::me))
        .route("/password", put(driver_portal::change_password))
        .route("/contents", get(driver_portal::list_contents))
        .route("/contents/{id}", get(driver_portal::get_content))
        .route("/contents/{id}/acknowledge", post(driver_portal::acknowledge))
        .route("/documents", get(driver_portal::list_documents))
        .route("/checklists", get(driver_portal::list_checklists))
        .route("/checklists/{id}", get(driver_portal::get_checklist))
        .route(
            "/checklists/{id}/submissions",
            post(driver_portal::submit_checklist),
        )
        .route("/submissions", get(driver_portal::list_submissions))
}
