//! Public story submission and the published story pages.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::db::{Story, StoryAnimal, StoryCategory, StoryStatus};
use crate::state::AppState;
use crate::stories::{submit_story, StorySubmission};

/// Most stories returned by the public listing.
pub const PUBLIC_LIST_LIMIT: i64 = 50;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stories).post(create_story))
        .route("/{slug}", get(get_story))
}

#[derive(Debug, Serialize)]
pub struct CreateStoryResponse {
    pub id: Uuid,
    pub slug: String,
    pub status: StoryStatus,
}

/// A story as shown on the public pages. The author's contact stays private.
#[derive(Debug, Serialize)]
pub struct PublishedStory {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub animal_type: StoryAnimal,
    pub city: String,
    pub month_year: String,
    pub excerpt: String,
    pub content: String,
    pub author_name: Option<String>,
    pub category: StoryCategory,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<Story> for PublishedStory {
    fn from(story: Story) -> Self {
        Self {
            id: story.id,
            slug: story.slug,
            title: story.title,
            animal_type: story.animal_type,
            city: story.city,
            month_year: story.month_year,
            excerpt: story.excerpt,
            content: story.content,
            author_name: story.author_name,
            category: story.category.unwrap_or(StoryCategory::DEFAULT),
            published_at: story.published_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListStoriesResponse {
    pub items: Vec<PublishedStory>,
}

async fn create_story(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<StorySubmission>,
) -> Result<(StatusCode, Json<CreateStoryResponse>), ApiError> {
    let story = submit_story(state.stories(), &req, Utc::now())
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;

    tracing::info!(request_id = %ctx.request_id, story_id = %story.id, "Story received");

    Ok((
        StatusCode::CREATED,
        Json(CreateStoryResponse {
            id: story.id,
            slug: story.slug,
            status: story.status,
        }),
    ))
}

async fn list_stories(
    State(state): State<AppState>,
) -> Result<Json<ListStoriesResponse>, ApiError> {
    let stories = state.stories().list_published(PUBLIC_LIST_LIMIT).await?;
    Ok(Json(ListStoriesResponse {
        items: stories.into_iter().map(PublishedStory::from).collect(),
    }))
}

async fn get_story(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(slug): Path<String>,
) -> Result<Json<PublishedStory>, ApiError> {
    match state.stories().find_published(&slug).await? {
        Some(story) => Ok(Json(story.into())),
        None => Err(ApiError::not_found("not_found", "No published story at that address.")
            .with_request_id(ctx.request_id)),
    }
}
