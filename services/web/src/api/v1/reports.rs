//! Public report submission.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::Utc;
use pawscue_case_id::LostCaseId;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::db::ReportType;
use crate::reports::{submit_report, ReportSubmission};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", post(create_report))
}

#[derive(Debug, Serialize)]
pub struct CreateReportResponse {
    pub id: Uuid,

    pub report_type: ReportType,

    /// Present for lost reports; the owner needs it to close the case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lost_case_id: Option<LostCaseId>,
}

async fn create_report(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<ReportSubmission>,
) -> Result<(StatusCode, Json<CreateReportResponse>), ApiError> {
    let report = submit_report(state.store(), state.geocoder(), &req, Utc::now())
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;

    tracing::info!(
        request_id = %ctx.request_id,
        report_id = %report.id,
        report_type = report.report_type.as_str(),
        "Report submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateReportResponse {
            id: report.id,
            report_type: report.report_type,
            lost_case_id: report.lost_case_id,
        }),
    ))
}
