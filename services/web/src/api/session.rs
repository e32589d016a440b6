//! Admin session extraction.

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;
use pawscue_admin_session::token_from_cookie_header;

use super::error::ApiError;
use super::request_context::{header_string, REQUEST_ID_HEADER};
use crate::state::AppState;

/// Proof that the request carries a valid admin session cookie.
///
/// Handlers that take this extractor reject anonymous requests with
/// `401 unauthorized`.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession;

/// Finds the session token across every `Cookie` header.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(token_from_cookie_header)
}

/// True when the request carries a currently valid session.
pub(crate) fn has_admin_session(headers: &HeaderMap, state: &AppState) -> bool {
    session_token(headers)
        .is_some_and(|token| state.admin().sessions().verify(token, Utc::now()))
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if has_admin_session(&parts.headers, state) {
            return Ok(AdminSession);
        }

        let mut error = ApiError::unauthorized("unauthorized", "Admin sign-in required.");
        if let Some(request_id) = header_string(&parts.headers, REQUEST_ID_HEADER) {
            error = error.with_request_id(request_id);
        }
        Err(error)
    }
}
