//! Handlers for `/admin/reports`: the consolidated checklist report as JSON
//! or as a PDF download.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleetcheck_core::error::CoreError;
use fleetcheck_core::report::{consolidate, ConsolidatedReport, ReportFilter, SubmissionSummary};
use fleetcheck_db::models::vehicle::Vehicle;
use fleetcheck_db::repositories::{ReportRepo, VehicleRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireStaff, StaffUser};
use crate::pdf::{filter_description, render_report};
use crate::state::AppState;

/// Validate the filter and load the report within the caller's scope.
async fn build_report(
    state: &AppState,
    staff: &StaffUser,
    filter: &ReportFilter,
) -> AppResult<(ConsolidatedReport, Option<Vehicle>)> {
    filter.validate()?;

    let vehicle = match filter.vehicle_id {
        Some(id) => {
            let vehicle = VehicleRepo::find_by_id(&state.pool, id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound { entity: "Vehicle", id }))?;
            staff.scope.ensure(&vehicle.unit)?;
            Some(vehicle)
        }
        None => None,
    };

    let rows = ReportRepo::submission_summaries(&state.pool, filter, staff.scope.filter()).await?;
    let summaries: Vec<SubmissionSummary> = rows.into_iter().map(Into::into).collect();
    Ok((consolidate(summaries), vehicle))
}

/// GET /api/v1/admin/reports/submissions
///
/// Query: `from`, `to` (inclusive `YYYY-MM-DD`), `vehicle_id`, `checklist_kind`.
pub async fn consolidated_report(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<ConsolidatedReport>> {
    let (report, _) = build_report(&state, &staff, &filter).await?;
    Ok(Json(report))
}

/// GET /api/v1/admin/reports/submissions/pdf
///
/// Same filters as the JSON report, rendered as a landscape A4 PDF.
pub async fn consolidated_report_pdf(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Response> {
    let (report, vehicle) = build_report(&state, &staff, &filter).await?;
    let description = filter_description(&filter, vehicle.as_ref().map(|v| v.name.as_str()));
    let font_dir = state.config.report_font_dir.clone();
    let font_name = state.config.report_font_name.clone();
    let submission_count = report.submission_count;

    let bytes = tokio::task::spawn_blocking(move || {
        render_report(&report, &description, &font_dir, &font_name)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("PDF task failed: {e}")))?
    .map_err(|e| AppError::InternalError(format!("PDF rendering failed: {e}")))?;

    tracing::info!(
        submissions = submission_count,
        bytes = bytes.len(),
        user_id = staff.user_id,
        "Rendered report PDF"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"relatorio-checklists.pdf\"",
            ),
        ],
        bytes,
    )
        .into_response())
}
