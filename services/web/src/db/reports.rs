//! Report rows and the store capability the service depends on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pawscue_case_id::LostCaseId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StoreError;

/// Name of the unique index guarding open lost case IDs.
///
/// Must match `migrations/0001_reports.sql`.
pub const LOST_CASE_ID_CONSTRAINT: &str = "reports_open_lost_case_id_key";

/// Kind of report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    NeedHelp,
    Lost,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::NeedHelp => "need_help",
            ReportType::Lost => "lost",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "need_help" => Some(ReportType::NeedHelp),
            "lost" => Some(ReportType::Lost),
            _ => None,
        }
    }
}

/// Workflow status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Reported,
    Resolved,
    Cancelled,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Reported => "Reported",
            ReportStatus::Resolved => "Resolved",
            ReportStatus::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Reported" => Some(ReportStatus::Reported),
            "Resolved" => Some(ReportStatus::Resolved),
            "Cancelled" => Some(ReportStatus::Cancelled),
            _ => None,
        }
    }
}

/// A stored report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub id: Uuid,
    pub report_type: ReportType,
    pub species: String,
    pub condition: String,
    pub description: Option<String>,
    pub location_description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub address_source: Option<String>,
    pub geocoded_at: Option<DateTime<Utc>>,
    pub time_zone: Option<String>,
    pub reporter_contact: Option<String>,
    pub status: ReportStatus,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub lost_case_id: Option<LostCaseId>,
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// True once the case has been resolved or cancelled.
    pub fn is_closed(&self) -> bool {
        self.resolved_at.is_some() || self.status != ReportStatus::Reported
    }

    /// True when the report carries an expiry that has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// True while a lost case can still be resolved or cancelled.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        !self.is_closed() && !self.is_expired(now)
    }
}

/// Persistence for reports.
///
/// The store owns uniqueness of open lost case IDs: an insert that reuses
/// one must fail with [`StoreError::UniqueViolation`] naming
/// [`LOST_CASE_ID_CONSTRAINT`].
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Inserts a new report.
    async fn insert(&self, report: &Report) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Report>, StoreError>;

    /// Finds the most recent lost report holding `case_id`.
    async fn find_by_case_id(&self, case_id: &LostCaseId) -> Result<Option<Report>, StoreError>;

    /// Closes an open lost case. Returns false if it was already closed.
    async fn close_case(
        &self,
        id: Uuid,
        status: ReportStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Lists reports, newest first.
    async fn list(&self, limit: i64) -> Result<Vec<Report>, StoreError>;

    /// Deletes a report. Returns false if it did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Checks that the store is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}
