//! Health check endpoints.
//!
//! These endpoints are used by load balancers and orchestration systems
//! to determine if the service is healthy and ready to receive traffic.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

const SERVICE_NAME: &str = "pawscue-web";

/// Health check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status: "ok" or "degraded".
    pub status: String,

    pub service: String,

    pub version: String,

    /// Current timestamp (ISO 8601).
    pub timestamp: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<ComponentHealth>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ComponentHealth {
    /// Report store reachability.
    pub store: ComponentStatus,

    /// "ok" when a provider is configured, "disabled" otherwise.
    pub geocoder: ComponentStatus,
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ComponentStatus {
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/livez", get(livez))
}

fn response(status: &str, components: Option<ComponentHealth>) -> HealthResponse {
    HealthResponse {
        status: status.to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        components,
    }
}

/// Liveness without dependency checks.
async fn healthz() -> impl IntoResponse {
    Json(response("ok", None))
}

/// Returns 503 while the report store is unreachable.
async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let store_result = state.store().health_check().await;
    let store_ok = store_result.is_ok();
    if let Err(e) = &store_result {
        tracing::warn!(error = %e, "Readiness check failed");
    }

    let components = ComponentHealth {
        store: ComponentStatus {
            status: if store_ok { "ok" } else { "unavailable" }.to_string(),
            message: store_result.err().map(|e| e.to_string()),
        },
        geocoder: ComponentStatus {
            status: match state.geocoder() {
                Some(_) => "ok",
                None => "disabled",
            }
            .to_string(),
            message: None,
        },
    };

    let body = response(if store_ok { "ok" } else { "degraded" }, Some(components));
    if store_ok {
        (StatusCode::OK, Json(body))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(body))
    }
}

async fn livez() -> impl IntoResponse {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::to_bytes;
    use chrono::DateTime;
    use pawscue_case_id::LostCaseId;
    use uuid::Uuid;

    use super::*;
    use crate::db::{
        MemoryReportStore, MemoryStoryStore, Report, ReportStatus, ReportStore, StoreError,
    };
    use crate::state::AdminAuth;

    /// A report store whose backend is gone.
    struct UnreachableStore;

    fn unreachable() -> StoreError {
        StoreError::CorruptRow("connection reset".to_string())
    }

    #[async_trait]
    impl ReportStore for UnreachableStore {
        async fn insert(&self, _report: &Report) -> Result<(), StoreError> {
            Err(unreachable())
        }

        async fn get(&self, _id: Uuid) -> Result<Option<Report>, StoreError> {
            Err(unreachable())
        }

        async fn find_by_case_id(
            &self,
            _case_id: &LostCaseId,
        ) -> Result<Option<Report>, StoreError> {
            Err(unreachable())
        }

        async fn close_case(
            &self,
            _id: Uuid,
            _status: ReportStatus,
            _at: DateTime<Utc>,
        ) -> Result<bool, StoreError> {
            Err(unreachable())
        }

        async fn list(&self, _limit: i64) -> Result<Vec<Report>, StoreError> {
            Err(unreachable())
        }

        async fn delete(&self, _id: Uuid) -> Result<bool, StoreError> {
            Err(unreachable())
        }

        async fn health_check(&self) -> Result<(), StoreError> {
            Err(unreachable())
        }
    }

    fn state(store: Arc<dyn ReportStore>) -> AppState {
        let admin = AdminAuth::new("health-secret", "health-password", false).unwrap();
        AppState::new(store, Arc::new(MemoryStoryStore::new()), admin, None)
    }

    async fn ready(state: AppState) -> (StatusCode, HealthResponse) {
        let response = readyz(State(state)).await.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_readyz_with_memory_store() {
        let (status, body) = ready(state(Arc::new(MemoryReportStore::new()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");

        let components = body.components.unwrap();
        assert_eq!(components.store.status, "ok");
        assert_eq!(components.store.message, None);
        assert_eq!(components.geocoder.status, "disabled");
    }

    #[tokio::test]
    async fn test_readyz_with_unreachable_store() {
        let (status, body) = ready(state(Arc::new(UnreachableStore))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");

        let components = body.components.unwrap();
        assert_eq!(components.store.status, "unavailable");
        assert!(components
            .store
            .message
            .unwrap()
            .contains("connection reset"));
    }

    #[tokio::test]
    async fn test_healthz_returns_ok() {
        let response = healthz().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_livez_returns_ok() {
        let response = livez().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
