//! Postgres-backed report and story stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pawscue_case_id::LostCaseId;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use super::{
    Report, ReportStatus, ReportStore, ReportType, StoreError, Story, StoryAnimal, StoryCategory,
    StoryStatus, StoryStore,
};

const REPORT_COLUMNS: &str = r#"
    id, report_type, species, condition, description, location_description,
    latitude, longitude, address, address_source, geocoded_at, time_zone,
    reporter_contact, status, last_seen_at, expires_at, resolved_at,
    lost_case_id, created_at
"#;

const STORY_COLUMNS: &str = r#"
    id, slug, title, animal_type, city, month_year, excerpt, content,
    author_name, author_contact, status, category, created_at, published_at
"#;

#[derive(Clone)]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn insert(&self, report: &Report) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO reports (
                id, report_type, species, condition, description, location_description,
                latitude, longitude, address, address_source, geocoded_at, time_zone,
                reporter_contact, status, last_seen_at, expires_at, resolved_at,
                lost_case_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(report.id)
        .bind(report.report_type.as_str())
        .bind(&report.species)
        .bind(&report.condition)
        .bind(&report.description)
        .bind(&report.location_description)
        .bind(report.latitude)
        .bind(report.longitude)
        .bind(&report.address)
        .bind(&report.address_source)
        .bind(report.geocoded_at)
        .bind(&report.time_zone)
        .bind(&report.reporter_contact)
        .bind(report.status.as_str())
        .bind(report.last_seen_at)
        .bind(report.expires_at)
        .bind(report.resolved_at)
        .bind(report.lost_case_id.as_ref().map(LostCaseId::as_str))
        .bind(report.created_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_query)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Report>, StoreError> {
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        row.map(Report::try_from).transpose()
    }

    async fn find_by_case_id(&self, case_id: &LostCaseId) -> Result<Option<Report>, StoreError> {
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE lost_case_id = $1 AND report_type = 'lost'
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(case_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        row.map(Report::try_from).transpose()
    }

    async fn close_case(
        &self,
        id: Uuid,
        status: ReportStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE reports
            SET status = $2, resolved_at = $3
            WHERE id = $1 AND resolved_at IS NULL
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, limit: i64) -> Result<Vec<Report>, StoreError> {
        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            ORDER BY created_at DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        rows.into_iter().map(Report::try_from).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StoreError::Query)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgStoryStore {
    pool: PgPool,
}

impl PgStoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one(&self, sql: &str, id: Uuid) -> Result<Option<Story>, StoreError> {
        let row = sqlx::query_as::<_, StoryRow>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::Query)?;

        row.map(Story::try_from).transpose()
    }
}

#[async_trait]
impl StoryStore for PgStoryStore {
    async fn insert(&self, story: &Story) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO stories (
                id, slug, title, animal_type, city, month_year, excerpt, content,
                author_name, author_contact, status, category, created_at, published_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(story.id)
        .bind(&story.slug)
        .bind(&story.title)
        .bind(story.animal_type.as_str())
        .bind(&story.city)
        .bind(&story.month_year)
        .bind(&story.excerpt)
        .bind(&story.content)
        .bind(&story.author_name)
        .bind(&story.author_contact)
        .bind(story.status.as_str())
        .bind(story.category.as_ref().map(StoryCategory::as_str))
        .bind(story.created_at)
        .bind(story.published_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_query)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Story>, StoreError> {
        self.fetch_one(&format!("SELECT {STORY_COLUMNS} FROM stories WHERE id = $1"), id)
            .await
    }

    async fn find_published(&self, slug: &str) -> Result<Option<Story>, StoreError> {
        let row = sqlx::query_as::<_, StoryRow>(&format!(
            r#"
            SELECT {STORY_COLUMNS}
            FROM stories
            WHERE slug = $1 AND status = 'approved' AND published_at IS NOT NULL
            "#
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        row.map(Story::try_from).transpose()
    }

    async fn list_published(&self, limit: i64) -> Result<Vec<Story>, StoreError> {
        let rows = sqlx::query_as::<_, StoryRow>(&format!(
            r#"
            SELECT {STORY_COLUMNS}
            FROM stories
            WHERE status = 'approved' AND published_at IS NOT NULL
            ORDER BY published_at DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        rows.into_iter().map(Story::try_from).collect()
    }

    async fn list_by_status(
        &self,
        status: StoryStatus,
        limit: i64,
    ) -> Result<Vec<Story>, StoreError> {
        let rows = sqlx::query_as::<_, StoryRow>(&format!(
            r#"
            SELECT {STORY_COLUMNS}
            FROM stories
            WHERE status = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(status.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        rows.into_iter().map(Story::try_from).collect()
    }

    async fn approve(
        &self,
        id: Uuid,
        category: StoryCategory,
        at: DateTime<Utc>,
    ) -> Result<Option<Story>, StoreError> {
        let row = sqlx::query_as::<_, StoryRow>(&format!(
            r#"
            UPDATE stories
            SET status = 'approved', category = $2, published_at = $3
            WHERE id = $1
            RETURNING {STORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(category.as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        row.map(Story::try_from).transpose()
    }

    async fn reject(&self, id: Uuid) -> Result<Option<Story>, StoreError> {
        self.fetch_one(
            &format!(
                r#"
                UPDATE stories
                SET status = 'rejected', published_at = NULL
                WHERE id = $1
                RETURNING {STORY_COLUMNS}
                "#
            ),
            id,
        )
        .await
    }
}

// Database row types

#[derive(Debug)]
struct ReportRow {
    id: Uuid,
    report_type: String,
    species: String,
    condition: String,
    description: Option<String>,
    location_description: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    address: Option<String>,
    address_source: Option<String>,
    geocoded_at: Option<DateTime<Utc>>,
    time_zone: Option<String>,
    reporter_contact: Option<String>,
    status: String,
    last_seen_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    resolved_at: Option<DateTime<Utc>>,
    lost_case_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ReportRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            report_type: row.try_get("report_type")?,
            species: row.try_get("species")?,
            condition: row.try_get("condition")?,
            description: row.try_get("description")?,
            location_description: row.try_get("location_description")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            address: row.try_get("address")?,
            address_source: row.try_get("address_source")?,
            geocoded_at: row.try_get("geocoded_at")?,
            time_zone: row.try_get("time_zone")?,
            reporter_contact: row.try_get("reporter_contact")?,
            status: row.try_get("status")?,
            last_seen_at: row.try_get("last_seen_at")?,
            expires_at: row.try_get("expires_at")?,
            resolved_at: row.try_get("resolved_at")?,
            lost_case_id: row.try_get("lost_case_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<ReportRow> for Report {
    type Error = StoreError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let report_type = ReportType::from_str(&row.report_type).ok_or_else(|| {
            StoreError::CorruptRow(format!("unknown report_type '{}'", row.report_type))
        })?;
        let status = ReportStatus::from_str(&row.status)
            .ok_or_else(|| StoreError::CorruptRow(format!("unknown status '{}'", row.status)))?;
        let lost_case_id = row
            .lost_case_id
            .as_deref()
            .map(LostCaseId::parse)
            .transpose()
            .map_err(|e| StoreError::CorruptRow(e.to_string()))?;

        Ok(Report {
            id: row.id,
            report_type,
            species: row.species,
            condition: row.condition,
            description: row.description,
            location_description: row.location_description,
            latitude: row.latitude,
            longitude: row.longitude,
            address: row.address,
            address_source: row.address_source,
            geocoded_at: row.geocoded_at,
            time_zone: row.time_zone,
            reporter_contact: row.reporter_contact,
            status,
            last_seen_at: row.last_seen_at,
            expires_at: row.expires_at,
            resolved_at: row.resolved_at,
            lost_case_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug)]
struct StoryRow {
    id: Uuid,
    slug: String,
    title: String,
    animal_type: String,
    city: String,
    month_year: String,
    excerpt: String,
    content: String,
    author_name: Option<String>,
    author_contact: Option<String>,
    status: String,
    category: Option<String>,
    created_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for StoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            slug: row.try_get("slug")?,
            title: row.try_get("title")?,
            animal_type: row.try_get("animal_type")?,
            city: row.try_get("city")?,
            month_year: row.try_get("month_year")?,
            excerpt: row.try_get("excerpt")?,
            content: row.try_get("content")?,
            author_name: row.try_get("author_name")?,
            author_contact: row.try_get("author_contact")?,
            status: row.try_get("status")?,
            category: row.try_get("category")?,
            created_at: row.try_get("created_at")?,
            published_at: row.try_get("published_at")?,
        })
    }
}

impl TryFrom<StoryRow> for Story {
    type Error = StoreError;

    fn try_from(row: StoryRow) -> Result<Self, Self::Error> {
        let animal_type = StoryAnimal::from_str(&row.animal_type).ok_or_else(|| {
            StoreError::CorruptRow(format!("unknown animal_type '{}'", row.animal_type))
        })?;
        let status = StoryStatus::from_str(&row.status)
            .ok_or_else(|| StoreError::CorruptRow(format!("unknown status '{}'", row.status)))?;
        let category = row
            .category
            .as_deref()
            .map(|c| {
                StoryCategory::from_str(c)
                    .ok_or_else(|| StoreError::CorruptRow(format!("unknown category '{c}'")))
            })
            .transpose()?;

        Ok(Story {
            id: row.id,
            slug: row.slug,
            title: row.title,
            animal_type,
            city: row.city,
            month_year: row.month_year,
            excerpt: row.excerpt,
            content: row.content,
            author_name: row.author_name,
            author_contact: row.author_contact,
            status,
            category,
            created_at: row.created_at,
            published_at: row.published_at,
        })
    }
}
