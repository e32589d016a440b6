//! Lost-case lookup and owner-driven closure.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::reports::{close_lost_case, find_lost_case, CaseAction, ClosedCase, LostCaseView};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/resolve", post(resolve_case))
        .route("/cancel", post(cancel_case))
        .route("/{case_id}", get(get_case))
}

#[derive(Debug, Deserialize)]
pub struct CloseCaseRequest {
    #[serde(default)]
    pub case_id: String,

    /// Must match the contact given when the case was reported.
    #[serde(default)]
    pub contact: String,
}

async fn get_case(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(case_id): Path<String>,
) -> Result<Json<LostCaseView>, ApiError> {
    find_lost_case(state.store(), &case_id, Utc::now())
        .await
        .map(Json)
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id))
}

async fn close_case(
    state: &AppState,
    ctx: RequestContext,
    req: CloseCaseRequest,
    action: CaseAction,
) -> Result<Json<ClosedCase>, ApiError> {
    match close_lost_case(state.store(), &req.case_id, &req.contact, action, Utc::now()).await {
        Ok(closed) => Ok(Json(closed)),
        Err(e) => {
            tracing::info!(
                request_id = %ctx.request_id,
                action = action.as_str(),
                code = e.code(),
                "Lost case closure refused"
            );
            Err(ApiError::from(e).with_request_id(ctx.request_id))
        }
    }
}

async fn resolve_case(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<CloseCaseRequest>,
) -> Result<Json<ClosedCase>, ApiError> {
    close_case(&state, ctx, req, CaseAction::Resolve).await
}

async fn cancel_case(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<CloseCaseRequest>,
) -> Result<Json<ClosedCase>, ApiError> {
    close_case(&state, ctx, req, CaseAction::Cancel).await
}
