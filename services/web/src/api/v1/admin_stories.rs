//! Admin story review.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::api::session::AdminSession;
use crate::db::{Story, StoryStatus};
use crate::state::AppState;
use crate::stories::{approve_story, reject_story};

/// Most stories returned by one review listing.
pub const LIST_LIMIT: i64 = 200;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stories))
        .route("/{story_id}", get(get_story))
        .route("/{story_id}/approve", post(approve))
        .route("/{story_id}/reject", post(reject))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListStoriesQuery {
    /// `pending`, `approved` or `rejected`. Anything else lists pending.
    pub status: Option<String>,
}

impl ListStoriesQuery {
    fn status(&self) -> StoryStatus {
        self.status
            .as_deref()
            .and_then(|s| StoryStatus::from_str(s.trim()))
            .unwrap_or(StoryStatus::Pending)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ApproveStoryRequest {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListStoriesResponse {
    pub status: StoryStatus,
    pub items: Vec<Story>,
}

fn parse_story_id(raw: &str, ctx: &RequestContext) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::bad_request("invalid_story_id", "Story IDs are UUIDs.")
            .with_request_id(ctx.request_id.clone())
    })
}

async fn list_stories(
    _admin: AdminSession,
    State(state): State<AppState>,
    Query(query): Query<ListStoriesQuery>,
) -> Result<Json<ListStoriesResponse>, ApiError> {
    let status = query.status();
    let items = state.stories().list_by_status(status, LIST_LIMIT).await?;
    Ok(Json(ListStoriesResponse { status, items }))
}

async fn get_story(
    _admin: AdminSession,
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(story_id): Path<String>,
) -> Result<Json<Story>, ApiError> {
    let id = parse_story_id(&story_id, &ctx)?;
    match state.stories().get(id).await? {
        Some(story) => Ok(Json(story)),
        None => Err(ApiError::not_found("not_found", "No story with that ID.")
            .with_request_id(ctx.request_id)),
    }
}

async fn approve(
    _admin: AdminSession,
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(story_id): Path<String>,
    body: Option<Json<ApproveStoryRequest>>,
) -> Result<Json<Story>, ApiError> {
    let id = parse_story_id(&story_id, &ctx)?;
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let story = approve_story(state.stories(), id, req.category.as_deref(), Utc::now())
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;

    tracing::info!(
        request_id = %ctx.request_id,
        story_id = %story.id,
        category = story.category.map(|c| c.as_str()),
        "Story approved"
    );
    Ok(Json(story))
}

async fn reject(
    _admin: AdminSession,
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(story_id): Path<String>,
) -> Result<Json<Story>, ApiError> {
    let id = parse_story_id(&story_id, &ctx)?;

    let story = reject_story(state.stories(), id)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;

    tracing::info!(request_id = %ctx.request_id, story_id = %story.id, "Story rejected");
    Ok(Json(story))
}
