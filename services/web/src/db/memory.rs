//! In-process report and story stores.
//!
//! Used for local development (`PAWSCUE_STORE=memory`) and tests. They
//! enforce the same uniqueness rules as the Postgres schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pawscue_case_id::LostCaseId;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    Report, ReportStatus, ReportStore, StoreError, Story, StoryCategory, StoryStatus, StoryStore,
    LOST_CASE_ID_CONSTRAINT, STORY_SLUG_CONSTRAINT,
};

const PRIMARY_KEY_CONSTRAINT: &str = "reports_pkey";
const STORY_PRIMARY_KEY_CONSTRAINT: &str = "stories_pkey";

#[derive(Default)]
pub struct MemoryReportStore {
    reports: RwLock<Vec<Report>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reports.
    pub async fn len(&self) -> usize {
        self.reports.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reports.read().await.is_empty()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn insert(&self, report: &Report) -> Result<(), StoreError> {
        let mut reports = self.reports.write().await;

        if reports.iter().any(|r| r.id == report.id) {
            return Err(StoreError::UniqueViolation {
                constraint: PRIMARY_KEY_CONSTRAINT.to_string(),
            });
        }

        if let Some(case_id) = &report.lost_case_id {
            let taken = reports
                .iter()
                .any(|r| r.resolved_at.is_none() && r.lost_case_id.as_ref() == Some(case_id));
            if taken {
                return Err(StoreError::UniqueViolation {
                    constraint: LOST_CASE_ID_CONSTRAINT.to_string(),
                });
            }
        }

        reports.push(report.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Report>, StoreError> {
        let reports = self.reports.read().await;
        Ok(reports.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_case_id(&self, case_id: &LostCaseId) -> Result<Option<Report>, StoreError> {
        let reports = self.reports.read().await;
        Ok(reports
            .iter()
            .filter(|r| r.lost_case_id.as_ref() == Some(case_id))
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn close_case(
        &self,
        id: Uuid,
        status: ReportStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut reports = self.reports.write().await;
        let Some(report) = reports
            .iter_mut()
            .find(|r| r.id == id && r.resolved_at.is_none())
        else {
            return Ok(false);
        };

        report.status = status;
        report.resolved_at = Some(at);
        Ok(true)
    }

    async fn list(&self, limit: i64) -> Result<Vec<Report>, StoreError> {
        let reports = self.reports.read().await;
        let mut items: Vec<Report> = reports.clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(items)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut reports = self.reports.write().await;
        let before = reports.len();
        reports.retain(|r| r.id != id);
        Ok(reports.len() != before)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStoryStore {
    stories: RwLock<Vec<Story>>,
}

impl MemoryStoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn take(mut items: Vec<Story>, limit: i64) -> Vec<Story> {
        items.truncate(usize::try_from(limit).unwrap_or(0));
        items
    }
}

#[async_trait]
impl StoryStore for MemoryStoryStore {
    async fn insert(&self, story: &Story) -> Result<(), StoreError> {
        let mut stories = self.stories.write().await;

        if stories.iter().any(|s| s.id == story.id) {
            return Err(StoreError::UniqueViolation {
                constraint: STORY_PRIMARY_KEY_CONSTRAINT.to_string(),
            });
        }
        if stories.iter().any(|s| s.slug == story.slug) {
            return Err(StoreError::UniqueViolation {
                constraint: STORY_SLUG_CONSTRAINT.to_string(),
            });
        }

        stories.push(story.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Story>, StoreError> {
        let stories = self.stories.read().await;
        Ok(stories.iter().find(|s| s.id == id).cloned())
    }

    async fn find_published(&self, slug: &str) -> Result<Option<Story>, StoreError> {
        let stories = self.stories.read().await;
        Ok(stories
            .iter()
            .find(|s| s.slug == slug && s.is_published())
            .cloned())
    }

    async fn list_published(&self, limit: i64) -> Result<Vec<Story>, StoreError> {
        let stories = self.stories.read().await;
        let mut items: Vec<Story> = stories.iter().filter(|s| s.is_published()).cloned().collect();
        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(Self::take(items, limit))
    }

    async fn list_by_status(
        &self,
        status: StoryStatus,
        limit: i64,
    ) -> Result<Vec<Story>, StoreError> {
        let stories = self.stories.read().await;
        let mut items: Vec<Story> = stories.iter().filter(|s| s.status == status).cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Self::take(items, limit))
    }

    async fn approve(
        &self,
        id: Uuid,
        category: StoryCategory,
        at: DateTime<Utc>,
    ) -> Result<Option<Story>, StoreError> {
        let mut stories = self.stories.write().await;
        let Some(story) = stories.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        story.status = StoryStatus::Approved;
        story.category = Some(category);
        story.published_at = Some(at);
        Ok(Some(story.clone()))
    }

    async fn reject(&self, id: Uuid) -> Result<Option<Story>, StoreError> {
        let mut stories = self.stories.write().await;
        let Some(story) = stories.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        story.status = StoryStatus::Rejected;
        story.published_at = None;
        Ok(Some(story.clone()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Duration;

    use super::*;
    use crate::db::{ReportType, StoryAnimal};

    pub(crate) fn lost_report(case_id: &str, created_at: DateTime<Utc>) -> Report {
        Report {
            id: Uuid::new_v4(),
            report_type: ReportType::Lost,
            species: "Cat".to_string(),
            condition: "Lost".to_string(),
            description: Some("Ginger tabby, blue collar".to_string()),
            location_description: "Near the hawker centre".to_string(),
            latitude: Some(1.3521),
            longitude: Some(103.8198),
            address: None,
            address_source: None,
            geocoded_at: None,
            time_zone: Some("Asia/Singapore".to_string()),
            reporter_contact: Some("+65 8123 4567".to_string()),
            status: ReportStatus::Reported,
            last_seen_at: Some(created_at - Duration::hours(3)),
            expires_at: Some(created_at + Duration::days(14)),
            resolved_at: None,
            lost_case_id: Some(LostCaseId::parse(case_id).unwrap()),
            created_at,
        }
    }

    pub(crate) fn pending_story(slug: &str, created_at: DateTime<Utc>) -> Story {
        Story {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: "Mango and the Morning Bench".to_string(),
            animal_type: StoryAnimal::Cat,
            city: "Singapore".to_string(),
            month_year: "January 2026".to_string(),
            excerpt: "A shy orange cat learned to trust the neighbourhood.".to_string(),
            content: "Mango first appeared near the bakery bench.".to_string(),
            author_name: Some("Wei Ling".to_string()),
            author_contact: Some("weiling@example.com".to_string()),
            status: StoryStatus::Pending,
            category: None,
            created_at,
            published_at: None,
        }
    }

    #[tokio::test]
    async fn test_open_case_id_is_unique() {
        let store = MemoryReportStore::new();
        let now = Utc::now();
        store.insert(&lost_report("LOST-ABCDEF", now)).await.unwrap();

        let err = store
            .insert(&lost_report("LOST-ABCDEF", now))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation_on(LOST_CASE_ID_CONSTRAINT));
    }

    #[tokio::test]
    async fn test_closed_case_releases_id() {
        let store = MemoryReportStore::new();
        let now = Utc::now();
        let first = lost_report("LOST-ABCDEF", now);
        store.insert(&first).await.unwrap();
        assert!(store
            .close_case(first.id, ReportStatus::Resolved, now)
            .await
            .unwrap());
        assert!(!store
            .close_case(first.id, ReportStatus::Resolved, now)
            .await
            .unwrap());

        let second = lost_report("LOST-ABCDEF", now + Duration::seconds(1));
        store.insert(&second).await.unwrap();

        let case_id = LostCaseId::parse("LOST-ABCDEF").unwrap();
        let found = store.find_by_case_id(&case_id).await.unwrap().unwrap();
        assert_eq!(found.id, second.id);
    }

    #[tokio::test]
    async fn test_duplicate_primary_key() {
        let store = MemoryReportStore::new();
        let report = lost_report("LOST-ABCDEF", Utc::now());
        store.insert(&report).await.unwrap();
        let err = store.insert(&report).await.unwrap_err();
        assert!(err.is_unique_violation_on(PRIMARY_KEY_CONSTRAINT));
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let store = MemoryReportStore::new();
        let now = Utc::now();
        let older = lost_report("LOST-AAAAAA", now - Duration::hours(1));
        let newer = lost_report("LOST-BBBBBB", now);
        store.insert(&older).await.unwrap();
        store.insert(&newer).await.unwrap();

        let listed = store.list(10).await.unwrap();
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
        assert_eq!(store.list(1).await.unwrap().len(), 1);

        assert!(store.delete(older.id).await.unwrap());
        assert!(!store.delete(older.id).await.unwrap());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let store = MemoryReportStore::new();
        let report = lost_report("LOST-ABCDEF", Utc::now());
        store.insert(&report).await.unwrap();

        assert_eq!(store.get(report.id).await.unwrap(), Some(report.clone()));
        assert_eq!(store.get(Uuid::new_v4()).await.unwrap(), None);

        store.delete(report.id).await.unwrap();
        assert_eq!(store.get(report.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_story_slug_is_unique() {
        let stories = MemoryStoryStore::new();
        let now = Utc::now();
        stories.insert(&pending_story("mango-ab12", now)).await.unwrap();

        let err = stories
            .insert(&pending_story("mango-ab12", now))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation_on(STORY_SLUG_CONSTRAINT));
    }

    #[tokio::test]
    async fn test_story_moderation() {
        let stories = MemoryStoryStore::new();
        let now = Utc::now();
        let story = pending_story("mango-ab12", now);
        stories.insert(&story).await.unwrap();

        assert_eq!(stories.find_published("mango-ab12").await.unwrap(), None);
        assert!(stories.list_published(10).await.unwrap().is_empty());

        let approved = stories
            .approve(story.id, StoryCategory::Community, now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(approved.status, StoryStatus::Approved);
        assert_eq!(approved.category, Some(StoryCategory::Community));
        assert_eq!(approved.published_at, Some(now));
        assert_eq!(
            stories.find_published("mango-ab12").await.unwrap().unwrap().id,
            story.id
        );

        let rejected = stories.reject(story.id).await.unwrap().unwrap();
        assert_eq!(rejected.status, StoryStatus::Rejected);
        assert_eq!(rejected.published_at, None);
        assert_eq!(stories.find_published("mango-ab12").await.unwrap(), None);

        assert_eq!(stories.reject(Uuid::new_v4()).await.unwrap(), None);
        assert_eq!(
            stories
                .approve(Uuid::new_v4(), StoryCategory::DEFAULT, now)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_story_listings() {
        let stories = MemoryStoryStore::new();
        let now = Utc::now();
        let older = pending_story("older-aaaa", now - Duration::days(2));
        let newer = pending_story("newer-bbbb", now - Duration::days(1));
        let other = pending_story("other-cccc", now);
        for story in [&older, &newer, &other] {
            stories.insert(story).await.unwrap();
        }

        // Approved in the opposite order to submission
        stories.approve(newer.id, StoryCategory::Rescue, now).await.unwrap();
        stories
            .approve(older.id, StoryCategory::Rescue, now + Duration::minutes(1))
            .await
            .unwrap();

        let published: Vec<Uuid> = stories
            .list_published(10)
            .await
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(published, vec![older.id, newer.id]);

        let approved: Vec<Uuid> = stories
            .list_by_status(StoryStatus::Approved, 10)
            .await
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(approved, vec![newer.id, older.id]);

        let pending = stories.list_by_status(StoryStatus::Pending, 10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, other.id);
        assert_eq!(stories.list_published(1).await.unwrap().len(), 1);
    }
}
