//! HTTP API handlers and routing.

mod admin;
pub mod error;
mod health;
pub mod request_context;
pub mod session;
mod v1;

use axum::{
    http::{header, HeaderName, Method},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Create the main API router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Credentials are cookie-based; cross-origin callers only get the
    // public endpoints.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);

    let request_id = HeaderName::from_static(request_context::REQUEST_ID_HEADER);

    Router::new()
        // Health endpoints (no auth required)
        .merge(health::routes())
        .nest("/admin", admin::routes())
        .nest("/v1", v1::routes())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(cors),
        )
        .with_state(state)
}
