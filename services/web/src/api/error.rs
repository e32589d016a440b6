use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::StoreError;
use crate::reports::{FieldIssue, LookupError, SubmitError};
use crate::stories::{ModerationError, StorySubmitError};

/// RFC 7807 problem body.
#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    pub code: String,
    pub request_id: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<FieldIssue> for FieldError {
    fn from(issue: FieldIssue) -> Self {
        Self {
            field: issue.field.to_string(),
            message: issue.message.to_string(),
        }
    }
}

impl ProblemDetails {
    fn new(status: StatusCode, code: impl Into<String>, detail: impl Into<String>) -> Self {
        let code = code.into();
        let title = status
            .canonical_reason()
            .unwrap_or("Unknown Error")
            .to_string();
        Self {
            r#type: format!("/problems/{code}"),
            title,
            status: status.as_u16(),
            detail: detail.into(),
            instance: None,
            code,
            request_id: "unknown".to_string(),
            retryable: false,
            details: None,
        }
    }

    fn set_request_id(&mut self, request_id: impl Into<String>) {
        let request_id = request_id.into();
        self.request_id = request_id.clone();
        if self.instance.is_none() {
            self.instance = Some(request_id);
        }
    }

    fn set_details(&mut self, details: Vec<FieldError>) {
        self.details = Some(details);
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub problem: Box<ProblemDetails>,
}

impl ApiError {
    fn with_status(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        let problem = Box::new(ProblemDetails::new(status, code, message));
        Self { status, problem }
    }

    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, code, message)
    }

    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CONFLICT, code, message)
    }

    pub fn unauthorized(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, code, message)
    }

    pub fn forbidden(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::FORBIDDEN, code, message)
    }

    pub fn service_unavailable(code: impl Into<String>, message: impl Into<String>) -> Self {
        let mut error = Self::with_status(StatusCode::SERVICE_UNAVAILABLE, code, message);
        error.problem.retryable = true;
        error
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.problem.set_request_id(request_id);
        self
    }

    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.problem.set_details(details);
        self
    }

    pub fn code(&self) -> &str {
        &self.problem.code
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = %e, "Store failure");
        ApiError::internal("internal_error", "Something went wrong. Please try again.")
    }
}

impl From<LookupError> for ApiError {
    fn from(e: LookupError) -> Self {
        let code = e.code();
        match e {
            LookupError::InvalidCode => {
                ApiError::bad_request(code, "Case IDs look like LOST-7K4M9B.")
            }
            LookupError::NotFound => {
                ApiError::not_found(code, "No lost case matches that ID.")
            }
            LookupError::Mismatch => ApiError::forbidden(
                code,
                "That contact does not match the one given when the case was reported.",
            ),
            LookupError::AlreadyResolved => {
                ApiError::conflict(code, "This case is already closed.")
            }
            LookupError::Store(e) => e.into(),
        }
    }
}

impl From<SubmitError> for ApiError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Invalid(issues) => {
                ApiError::bad_request("invalid_report", "Please fix the highlighted fields.")
                    .with_details(issues.into_iter().map(FieldError::from).collect())
            }
            SubmitError::CaseIdExhausted { attempts } => {
                tracing::error!(attempts, "Could not allocate a lost case ID");
                ApiError::service_unavailable(
                    "case_id_unavailable",
                    "Could not create a case ID. Please try again.",
                )
            }
            SubmitError::Store(e) => e.into(),
        }
    }
}

impl From<StorySubmitError> for ApiError {
    fn from(e: StorySubmitError) -> Self {
        match e {
            StorySubmitError::Invalid(issues) => {
                ApiError::bad_request("invalid_story", "Please fix the highlighted fields.")
                    .with_details(issues.into_iter().map(FieldError::from).collect())
            }
            StorySubmitError::SlugExhausted { attempts } => {
                tracing::error!(attempts, "Could not allocate a story slug");
                ApiError::service_unavailable(
                    "slug_unavailable",
                    "Could not save your story. Please try again.",
                )
            }
            StorySubmitError::Store(e) => e.into(),
        }
    }
}

impl From<ModerationError> for ApiError {
    fn from(e: ModerationError) -> Self {
        let code = e.code();
        match e {
            ModerationError::InvalidCategory => ApiError::bad_request(
                code,
                "Category must be one of rescue, lost_found, shelter_foster or community.",
            ),
            ModerationError::NotFound => ApiError::not_found(code, "No story with that ID."),
            ModerationError::Store(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.problem)).into_response();
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(LookupError::InvalidCode, StatusCode::BAD_REQUEST, "invalid_code")]
    #[case(LookupError::NotFound, StatusCode::NOT_FOUND, "not_found")]
    #[case(LookupError::Mismatch, StatusCode::FORBIDDEN, "mismatch")]
    #[case(LookupError::AlreadyResolved, StatusCode::CONFLICT, "already_resolved")]
    fn test_lookup_error_mapping(
        #[case] error: LookupError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let api: ApiError = error.into();
        assert_eq!(api.status, status);
        assert_eq!(api.code(), code);
        assert_eq!(api.problem.r#type, format!("/problems/{code}"));
    }

    #[test]
    fn test_invalid_report_carries_fields() {
        let api: ApiError = SubmitError::Invalid(vec![FieldIssue {
            field: "species",
            message: "Please choose a species.",
        }])
        .into();
        let details = api.problem.details.as_ref().unwrap();
        assert_eq!(details[0].field, "species");
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case(ModerationError::InvalidCategory, StatusCode::BAD_REQUEST, "invalid_category")]
    #[case(ModerationError::NotFound, StatusCode::NOT_FOUND, "not_found")]
    fn test_moderation_error_mapping(
        #[case] error: ModerationError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let api: ApiError = error.into();
        assert_eq!(api.status, status);
        assert_eq!(api.code(), code);
    }

    #[test]
    fn test_slug_exhaustion_is_retryable() {
        let api: ApiError = StorySubmitError::SlugExhausted { attempts: 5 }.into();
        assert_eq!(api.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(api.code(), "slug_unavailable");
        assert!(api.problem.retryable);
    }

    #[test]
    fn test_problem_content_type() {
        let response = ApiError::unauthorized("unauthorized", "Sign in first.")
            .with_request_id("req_1")
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
    }
}
