//! Admin report moderation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::api::session::AdminSession;
use crate::db::Report;
use crate::state::AppState;
use crate::time::ReportLabels;

/// Most reports returned by one listing.
pub const LIST_LIMIT: i64 = 200;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reports))
        .route("/{report_id}", get(get_report).delete(delete_report))
}

#[derive(Debug, Serialize)]
pub struct AdminReport {
    #[serde(flatten)]
    pub report: Report,
    pub labels: ReportLabels,
}

#[derive(Debug, Serialize)]
pub struct ListReportsResponse {
    pub items: Vec<AdminReport>,
}

async fn list_reports(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<ListReportsResponse>, ApiError> {
    let reports = state.store().list(LIST_LIMIT).await?;
    let items = reports
        .into_iter()
        .map(|report| AdminReport {
            labels: ReportLabels::for_report(&report),
            report,
        })
        .collect();
    Ok(Json(ListReportsResponse { items }))
}

fn parse_report_id(raw: &str, ctx: &RequestContext) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::bad_request("invalid_report_id", "Report IDs are UUIDs.")
            .with_request_id(ctx.request_id.clone())
    })
}

async fn get_report(
    _admin: AdminSession,
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(report_id): Path<String>,
) -> Result<Json<AdminReport>, ApiError> {
    let id = parse_report_id(&report_id, &ctx)?;
    match state.store().get(id).await? {
        Some(report) => Ok(Json(AdminReport {
            labels: ReportLabels::for_report(&report),
            report,
        })),
        None => Err(ApiError::not_found("not_found", "No report with that ID.")
            .with_request_id(ctx.request_id)),
    }
}

async fn delete_report(
    _admin: AdminSession,
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(report_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_report_id(&report_id, &ctx)?;

    if !state.store().delete(id).await? {
        return Err(ApiError::not_found("not_found", "No report with that ID.")
            .with_request_id(ctx.request_id));
    }

    tracing::info!(request_id = %ctx.request_id, report_id = %id, "Report deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}
