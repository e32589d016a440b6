//! Admin moderation of submitted stories.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::{StoreError, Story, StoryCategory, StoryStore};

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("unknown story category")]
    InvalidCategory,

    #[error("story not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ModerationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ModerationError::InvalidCategory => "invalid_category",
            ModerationError::NotFound => "not_found",
            ModerationError::Store(_) => "internal_error",
        }
    }
}

/// Reads a moderator's category choice. Blank means "no choice".
pub fn parse_category(input: Option<&str>) -> Result<Option<StoryCategory>, ModerationError> {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    StoryCategory::from_str(&raw.to_ascii_lowercase())
        .map(Some)
        .ok_or(ModerationError::InvalidCategory)
}

/// Publishes a story as of `now`.
///
/// The story is filed under `category` when given, otherwise it keeps the
/// category it already has, falling back to [`StoryCategory::DEFAULT`].
pub async fn approve_story(
    store: &dyn StoryStore,
    id: Uuid,
    category: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Story, ModerationError> {
    let requested = parse_category(category)?;
    let current = store.get(id).await?.ok_or(ModerationError::NotFound)?;
    let category = requested
        .or(current.category)
        .unwrap_or(StoryCategory::DEFAULT);

    store
        .approve(id, category, now)
        .await?
        .ok_or(ModerationError::NotFound)
}

/// Rejects a story and takes it off the public pages.
pub async fn reject_story(store: &dyn StoryStore, id: Uuid) -> Result<Story, ModerationError> {
    store.reject(id).await?.ok_or(ModerationError::NotFound)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rstest::rstest;

    use super::*;
    use crate::db::{pending_story, MemoryStoryStore, StoryStatus};

    #[rstest]
    #[case(None, None)]
    #[case(Some("  "), None)]
    #[case(Some("lost_found"), Some(StoryCategory::LostFound))]
    #[case(Some(" Shelter_Foster "), Some(StoryCategory::ShelterFoster))]
    fn test_parse_category(#[case] input: Option<&str>, #[case] expected: Option<StoryCategory>) {
        assert_eq!(parse_category(input).unwrap(), expected);
    }

    #[rstest]
    #[case("community_moments")]
    #[case("adoption")]
    fn test_unknown_category(#[case] input: &str) {
        assert!(matches!(
            parse_category(Some(input)),
            Err(ModerationError::InvalidCategory)
        ));
    }

    #[tokio::test]
    async fn test_approve_defaults_to_rescue() {
        let store = MemoryStoryStore::new();
        let now = Utc::now();
        let story = pending_story("mango-ab12", now - Duration::days(1));
        store.insert(&story).await.unwrap();

        let approved = approve_story(&store, story.id, None, now).await.unwrap();
        assert_eq!(approved.status, StoryStatus::Approved);
        assert_eq!(approved.category, Some(StoryCategory::Rescue));
        assert_eq!(approved.published_at, Some(now));
        assert!(store.find_published("mango-ab12").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_reapproval_keeps_existing_category() {
        let store = MemoryStoryStore::new();
        let now = Utc::now();
        let story = pending_story("mango-ab12", now);
        store.insert(&story).await.unwrap();

        approve_story(&store, story.id, Some("community"), now)
            .await
            .unwrap();
        reject_story(&store, story.id).await.unwrap();

        let later = now + Duration::hours(1);
        let again = approve_story(&store, story.id, Some(""), later)
            .await
            .unwrap();
        assert_eq!(again.category, Some(StoryCategory::Community));
        assert_eq!(again.published_at, Some(later));
    }

    #[tokio::test]
    async fn test_reject_unpublishes() {
        let store = MemoryStoryStore::new();
        let now = Utc::now();
        let story = pending_story("mango-ab12", now);
        store.insert(&story).await.unwrap();
        approve_story(&store, story.id, None, now).await.unwrap();

        let rejected = reject_story(&store, story.id).await.unwrap();
        assert_eq!(rejected.status, StoryStatus::Rejected);
        assert_eq!(rejected.published_at, None);
        assert_eq!(store.find_published("mango-ab12").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_story() {
        let store = MemoryStoryStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            approve_story(&store, id, None, Utc::now()).await,
            Err(ModerationError::NotFound)
        ));
        assert!(matches!(
            reject_story(&store, id).await,
            Err(ModerationError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_bad_category_leaves_story_pending() {
        let store = MemoryStoryStore::new();
        let story = pending_story("mango-ab12", Utc::now());
        store.insert(&story).await.unwrap();

        assert!(matches!(
            approve_story(&store, story.id, Some("adoption"), Utc::now()).await,
            Err(ModerationError::InvalidCategory)
        ));
        let stored = store.get(story.id).await.unwrap().unwrap();
        assert_eq!(stored.status, StoryStatus::Pending);
    }
}
