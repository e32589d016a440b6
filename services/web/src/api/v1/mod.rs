//! API v1 routes.

mod admin_reports;
mod admin_stories;
mod lost_cases;
mod reports;
mod stories;

use axum::Router;

use crate::state::AppState;

/// Create API v1 routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/reports", reports::routes())
        .nest("/lost-cases", lost_cases::routes())
        .nest("/stories", stories::routes())
        // Admin-only: every handler takes the AdminSession extractor.
        .nest("/admin/reports", admin_reports::routes())
        .nest("/admin/stories", admin_stories::routes())
}
