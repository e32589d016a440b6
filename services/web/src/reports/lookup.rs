//! Looking up, resolving and cancelling lost cases by case ID.

use chrono::{DateTime, Utc};
use pawscue_case_id::LostCaseId;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::db::{Report, ReportStatus, ReportStore, StoreError};
use crate::time::ReportLabels;

/// What the owner wants done with their case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseAction {
    /// The animal was found.
    Resolve,
    Cancel,
}

impl CaseAction {
    pub fn status(self) -> ReportStatus {
        match self {
            CaseAction::Resolve => ReportStatus::Resolved,
            CaseAction::Cancel => ReportStatus::Cancelled,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CaseAction::Resolve => "resolve",
            CaseAction::Cancel => "cancel",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("case ID is not in the LOST-XXXXXX format")]
    InvalidCode,

    #[error("no lost case with that ID")]
    NotFound,

    #[error("contact does not match the case")]
    Mismatch,

    #[error("case is already closed")]
    AlreadyResolved,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LookupError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            LookupError::InvalidCode => "invalid_code",
            LookupError::NotFound => "not_found",
            LookupError::Mismatch => "mismatch",
            LookupError::AlreadyResolved => "already_resolved",
            LookupError::Store(_) => "internal_error",
        }
    }
}

/// Public view of a lost case. Never carries the owner's contact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LostCaseView {
    pub case_id: LostCaseId,
    pub species: String,
    pub description: Option<String>,
    pub location_description: String,
    pub address: Option<String>,
    pub time_zone: Option<String>,
    pub status: ReportStatus,
    /// False once closed or past expiry.
    pub open: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub labels: ReportLabels,
}

impl LostCaseView {
    fn from_report(case_id: LostCaseId, report: &Report, now: DateTime<Utc>) -> Self {
        Self {
            case_id,
            species: report.species.clone(),
            description: report.description.clone(),
            location_description: report.location_description.clone(),
            address: report.address.clone(),
            time_zone: report.time_zone.clone(),
            status: report.status,
            open: report.is_open(now),
            last_seen_at: report.last_seen_at,
            expires_at: report.expires_at,
            resolved_at: report.resolved_at,
            created_at: report.created_at,
            labels: ReportLabels::for_report(report),
        }
    }
}

/// Outcome of a successful resolve or cancel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedCase {
    pub id: Uuid,
    pub case_id: LostCaseId,
    pub status: ReportStatus,
    pub resolved_at: DateTime<Utc>,
}

fn parse_case_id(raw: &str) -> Result<LostCaseId, LookupError> {
    LostCaseId::parse(raw).map_err(|_| LookupError::InvalidCode)
}

async fn load_case(
    store: &dyn ReportStore,
    case_id: &LostCaseId,
) -> Result<Report, LookupError> {
    store
        .find_by_case_id(case_id)
        .await?
        .ok_or(LookupError::NotFound)
}

/// Finds a lost case by a user-typed code such as `" lost-7k4m9b "`.
pub async fn find_lost_case(
    store: &dyn ReportStore,
    raw_case_id: &str,
    now: DateTime<Utc>,
) -> Result<LostCaseView, LookupError> {
    let case_id = parse_case_id(raw_case_id)?;
    let report = load_case(store, &case_id).await?;
    Ok(LostCaseView::from_report(case_id, &report, now))
}

/// Resolves or cancels a lost case on behalf of its owner.
///
/// Checks run in order: code format, existence, still open (closed and
/// expired cases both count as already resolved), then the contact, which
/// must equal the stored one after trimming both sides.
pub async fn close_lost_case(
    store: &dyn ReportStore,
    raw_case_id: &str,
    contact: &str,
    action: CaseAction,
    now: DateTime<Utc>,
) -> Result<ClosedCase, LookupError> {
    let case_id = parse_case_id(raw_case_id)?;
    let report = load_case(store, &case_id).await?;

    if !report.is_open(now) {
        return Err(LookupError::AlreadyResolved);
    }

    let stored_contact = report.reporter_contact.as_deref().map(str::trim);
    let given = contact.trim();
    if given.is_empty() || stored_contact != Some(given) {
        return Err(LookupError::Mismatch);
    }

    let status = action.status();
    if !store.close_case(report.id, status, now).await? {
        // Closed by someone else between the read and the update.
        return Err(LookupError::AlreadyResolved);
    }

    info!(report_id = %report.id, case_id = %case_id, action = action.as_str(), "Lost case closed");
    Ok(ClosedCase {
        id: report.id,
        case_id,
        status,
        resolved_at: now,
    })
}
