//! Admin sign-in, sign-out and session status.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::ApiError;
use super::request_context::RequestContext;
use super::session::has_admin_session;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(session))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub admin: bool,
}

async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let admin = state.admin();
    if !admin.check_password(req.password.trim()) {
        warn!(request_id = %ctx.request_id, "Admin sign-in rejected");
        return Err(
            ApiError::unauthorized("invalid_credentials", "Incorrect password.")
                .with_request_id(ctx.request_id),
        );
    }

    let token = admin.sessions().issue(Utc::now());
    let cookie = admin.cookies().session(token);
    info!(request_id = %ctx.request_id, "Admin signed in");

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie.to_string())],
        Json(SessionResponse { admin: true }),
    ))
}

async fn logout(State(state): State<AppState>, ctx: RequestContext) -> impl IntoResponse {
    info!(request_id = %ctx.request_id, "Admin signed out");
    let cookie = state.admin().cookies().revoke();
    (
        StatusCode::OK,
        [(SET_COOKIE, cookie.to_string())],
        Json(SessionResponse { admin: false }),
    )
}

async fn session(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionResponse> {
    Json(SessionResponse {
        admin: has_admin_session(&headers, &state),
    })
}
