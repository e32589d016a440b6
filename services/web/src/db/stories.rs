//! Community story rows and the store capability behind them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StoreError;

/// Name of the unique index on story slugs.
///
/// Must match `migrations/0002_stories.sql`.
pub const STORY_SLUG_CONSTRAINT: &str = "stories_slug_key";

/// Animal a story is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryAnimal {
    Cat,
    Dog,
    Bird,
    Other,
}

impl StoryAnimal {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryAnimal::Cat => "cat",
            StoryAnimal::Dog => "dog",
            StoryAnimal::Bird => "bird",
            StoryAnimal::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cat" => Some(StoryAnimal::Cat),
            "dog" => Some(StoryAnimal::Dog),
            "bird" => Some(StoryAnimal::Bird),
            "other" => Some(StoryAnimal::Other),
            _ => None,
        }
    }
}

/// Moderation state of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    Pending,
    Approved,
    Rejected,
}

impl StoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryStatus::Pending => "pending",
            StoryStatus::Approved => "approved",
            StoryStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(StoryStatus::Pending),
            "approved" => Some(StoryStatus::Approved),
            "rejected" => Some(StoryStatus::Rejected),
            _ => None,
        }
    }
}

/// Section a published story is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryCategory {
    Rescue,
    LostFound,
    ShelterFoster,
    Community,
}

impl StoryCategory {
    /// Category given to stories approved without one.
    pub const DEFAULT: StoryCategory = StoryCategory::Rescue;

    pub fn as_str(&self) -> &'static str {
        match self {
            StoryCategory::Rescue => "rescue",
            StoryCategory::LostFound => "lost_found",
            StoryCategory::ShelterFoster => "shelter_foster",
            StoryCategory::Community => "community",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "rescue" => Some(StoryCategory::Rescue),
            "lost_found" => Some(StoryCategory::LostFound),
            "shelter_foster" => Some(StoryCategory::ShelterFoster),
            "community" => Some(StoryCategory::Community),
            _ => None,
        }
    }
}

/// A stored story.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Story {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub animal_type: StoryAnimal,
    pub city: String,
    /// Free text such as "March 2025".
    pub month_year: String,
    pub excerpt: String,
    pub content: String,
    pub author_name: Option<String>,
    pub author_contact: Option<String>,
    pub status: StoryStatus,
    /// Unset until a moderator approves the story.
    pub category: Option<StoryCategory>,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Story {
    /// True when the story may be shown publicly.
    pub fn is_published(&self) -> bool {
        self.status == StoryStatus::Approved && self.published_at.is_some()
    }
}

/// Persistence for stories.
///
/// Slugs are unique: an insert that reuses one fails with
/// [`StoreError::UniqueViolation`] naming [`STORY_SLUG_CONSTRAINT`].
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Inserts a new story.
    async fn insert(&self, story: &Story) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Story>, StoreError>;

    /// Finds a published story by slug.
    async fn find_published(&self, slug: &str) -> Result<Option<Story>, StoreError>;

    /// Lists published stories, most recently published first.
    async fn list_published(&self, limit: i64) -> Result<Vec<Story>, StoreError>;

    /// Lists stories in `status`, newest submission first.
    async fn list_by_status(
        &self,
        status: StoryStatus,
        limit: i64,
    ) -> Result<Vec<Story>, StoreError>;

    /// Marks a story approved and published at `at`, filing it under
    /// `category`. Returns `None` if there is no such story.
    async fn approve(
        &self,
        id: Uuid,
        category: StoryCategory,
        at: DateTime<Utc>,
    ) -> Result<Option<Story>, StoreError>;

    /// Marks a story rejected and unpublishes it. Returns `None` if there is
    /// no such story.
    async fn reject(&self, id: Uuid) -> Result<Option<Story>, StoreError>;
}
