//! Report submission: validation, enrichment and storage.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::retry::{insert_lost_report, AssignError, MAX_CASE_ID_ATTEMPTS};
use crate::db::{Report, ReportStatus, ReportStore, ReportType, StoreError};
use crate::geocode::Geocoder;
use crate::time::parse_time_zone;

/// How long a lost case stays open without being resolved.
pub const LOST_CASE_TTL_DAYS: i64 = 14;

const LOST_CONDITION: &str = "Lost";

/// A coordinate as sent by clients: a JSON number or a form string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CoordinateInput {
    Number(f64),
    Text(String),
}

/// Report form as submitted. Every field is optional at this stage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportSubmission {
    pub report_type: String,
    pub species: String,
    pub condition: String,
    pub description: String,
    pub location_description: String,
    pub latitude: Option<CoordinateInput>,
    pub longitude: Option<CoordinateInput>,
    pub contact: String,
    pub last_seen_at: String,
    pub time_zone: String,
}

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldIssue {
    pub(crate) fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("report has {} invalid field(s)", .0.len())]
    Invalid(Vec<FieldIssue>),

    #[error("no free case ID after {attempts} attempts")]
    CaseIdExhausted { attempts: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AssignError> for SubmitError {
    fn from(e: AssignError) -> Self {
        match e {
            AssignError::Exhausted { attempts } => SubmitError::CaseIdExhausted { attempts },
            AssignError::Store(e) => SubmitError::Store(e),
        }
    }
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSubmission {
    pub report_type: ReportType,
    pub species: String,
    pub condition: String,
    pub description: Option<String>,
    pub location_description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contact: Option<String>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub time_zone: Option<String>,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `Ok(None)` for a blank value, `Err(())` for one that is not a finite number
/// within `[-limit, limit]`.
fn parse_coordinate(input: Option<&CoordinateInput>, limit: f64) -> Result<Option<f64>, ()> {
    let value = match input {
        None => return Ok(None),
        Some(CoordinateInput::Number(n)) => *n,
        Some(CoordinateInput::Text(s)) if s.trim().is_empty() => return Ok(None),
        Some(CoordinateInput::Text(s)) => s.trim().parse::<f64>().map_err(|_| ())?,
    };
    if value.is_finite() && value.abs() <= limit {
        Ok(Some(value))
    } else {
        Err(())
    }
}

/// Accepts RFC 3339, or a `datetime-local` style value (`2025-03-14T09:26`)
/// read in `zone` (UTC when absent).
fn parse_last_seen(input: &str, zone: Option<&str>) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())?;

    match zone.and_then(parse_time_zone) {
        Some(tz) => tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
        None => Some(Utc.from_utc_datetime(&naive)),
    }
}

/// Checks a submission, collecting every field problem at once.
pub fn validate(input: &ReportSubmission) -> Result<ValidSubmission, Vec<FieldIssue>> {
    let mut issues = Vec::new();

    let report_type = match input.report_type.trim() {
        "" => ReportType::NeedHelp,
        other => ReportType::from_str(other).unwrap_or_else(|| {
            issues.push(FieldIssue::new("report_type", "Unknown report type."));
            ReportType::NeedHelp
        }),
    };
    let is_lost = report_type == ReportType::Lost;

    let species = non_blank(&input.species);
    if species.is_none() {
        issues.push(FieldIssue::new("species", "Please choose a species."));
    }

    let condition = non_blank(&input.condition);
    if !is_lost && condition.is_none() {
        issues.push(FieldIssue::new(
            "condition",
            "Please choose the animal's condition.",
        ));
    }

    let location_description = non_blank(&input.location_description);
    if location_description.is_none() {
        issues.push(FieldIssue::new(
            "location_description",
            "Please share a brief location note.",
        ));
    }

    let description = non_blank(&input.description);
    if is_lost && description.is_none() {
        issues.push(FieldIssue::new(
            "description",
            "Please add a short identifying description.",
        ));
    }

    let contact = non_blank(&input.contact);
    if is_lost && contact.is_none() {
        issues.push(FieldIssue::new("contact", "Please share a way to reach you."));
    }

    let latitude = parse_coordinate(input.latitude.as_ref(), 90.0).unwrap_or_else(|()| {
        issues.push(FieldIssue::new("latitude", "Latitude must be a valid number."));
        None
    });
    let longitude = parse_coordinate(input.longitude.as_ref(), 180.0).unwrap_or_else(|()| {
        issues.push(FieldIssue::new("longitude", "Longitude must be a valid number."));
        None
    });

    let time_zone = non_blank(&input.time_zone).filter(|tz| parse_time_zone(tz).is_some());

    let last_seen_input = non_blank(&input.last_seen_at);
    let last_seen_at = match &last_seen_input {
        None => {
            if is_lost {
                issues.push(FieldIssue::new(
                    "last_seen_at",
                    "Please add when the animal was last seen.",
                ));
            }
            None
        }
        Some(raw) => {
            let parsed = parse_last_seen(raw, time_zone.as_deref());
            if parsed.is_none() {
                issues.push(FieldIssue::new(
                    "last_seen_at",
                    "Please use a valid date and time.",
                ));
            }
            parsed
        }
    };

    if !issues.is_empty() {
        return Err(issues);
    }

    Ok(ValidSubmission {
        report_type,
        species: species.unwrap_or_default(),
        condition: if is_lost {
            LOST_CONDITION.to_string()
        } else {
            condition.unwrap_or_default()
        },
        description,
        location_description: location_description.unwrap_or_default(),
        latitude,
        longitude,
        contact,
        last_seen_at: if is_lost { last_seen_at } else { None },
        time_zone,
    })
}

/// Validates and stores a report.
///
/// Need-help reports with coordinates are reverse-geocoded first, best
/// effort. Lost reports get an expiry and a case ID.
pub async fn submit_report(
    store: &dyn ReportStore,
    geocoder: Option<&dyn Geocoder>,
    input: &ReportSubmission,
    now: DateTime<Utc>,
) -> Result<Report, SubmitError> {
    let valid = validate(input).map_err(SubmitError::Invalid)?;
    let is_lost = valid.report_type == ReportType::Lost;

    let mut report = Report {
        id: Uuid::new_v4(),
        report_type: valid.report_type,
        species: valid.species,
        condition: valid.condition,
        description: valid.description,
        location_description: valid.location_description,
        latitude: valid.latitude,
        longitude: valid.longitude,
        address: None,
        address_source: None,
        geocoded_at: None,
        time_zone: valid.time_zone,
        reporter_contact: valid.contact,
        status: ReportStatus::Reported,
        last_seen_at: valid.last_seen_at,
        expires_at: is_lost.then(|| now + Duration::days(LOST_CASE_TTL_DAYS)),
        resolved_at: None,
        lost_case_id: None,
        created_at: now,
    };

    let coordinates = report.latitude.zip(report.longitude);
    if let (false, Some(geocoder), Some((lat, lng))) = (is_lost, geocoder, coordinates) {
        let result = geocoder.reverse(lat, lng).await;
        if let Some(address) = result.address {
            debug!(report_id = %report.id, "Report address geocoded");
            report.address = Some(address);
            report.address_source = Some(geocoder.source().to_string());
            report.geocoded_at = Some(now);
        }
        if report.time_zone.is_none() {
            report.time_zone = result.time_zone.filter(|tz| parse_time_zone(tz).is_some());
        }
    }

    if is_lost {
        let stored = insert_lost_report(store, report, MAX_CASE_ID_ATTEMPTS).await?;
        return Ok(stored);
    }

    store.insert(&report).await?;
    info!(report_id = %report.id, "Report stored");
    Ok(report)
}
