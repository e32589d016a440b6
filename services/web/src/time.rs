//! Human-readable "reported at" labels.
//!
//! Timestamps are shown in the report's own time zone when one is known,
//! tagged with the place and UTC offset, e.g.
//! `Reported (Tampines, UTC+8): 14 Mar 2025, 17:26`.

use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::db::Report;

/// Zone used when a report carries no usable time zone.
pub const DEFAULT_TIME_ZONE: &str = "UTC";

const DEFAULT_LABEL: &str = "Reported";

/// Inputs for [`format_report_timestamp`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportTimeInput<'a> {
    /// RFC 3339 timestamp.
    pub timestamp: &'a str,
    /// IANA zone name, e.g. `Asia/Singapore`.
    pub time_zone: Option<&'a str>,
    /// Offset to display instead of the one derived from the zone.
    pub utc_offset_minutes: Option<i32>,
    /// Short place name shown next to the offset.
    pub place_label: Option<&'a str>,
    /// Leading label; defaults to `Reported`.
    pub label: Option<&'a str>,
}

/// Parses an IANA time zone name.
pub fn parse_time_zone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Formats as `14 Mar 2025, 09:26` in the given zone.
pub fn format_date_time<Z: TimeZone>(instant: DateTime<Utc>, zone: &Z) -> String
where
    Z::Offset: std::fmt::Display,
{
    instant
        .with_timezone(zone)
        .format("%d %b %Y, %H:%M")
        .to_string()
}

/// Offset of `zone` from UTC at `instant`, in minutes.
pub fn utc_offset_minutes(instant: DateTime<Utc>, zone: Tz) -> i32 {
    zone.offset_from_utc_datetime(&instant.naive_utc())
        .fix()
        .local_minus_utc()
        / 60
}

/// Renders an offset as `UTC`, `UTC+8` or `UTC-3:30`.
pub fn format_utc_offset(offset_minutes: i32) -> String {
    if offset_minutes == 0 {
        return DEFAULT_TIME_ZONE.to_string();
    }
    let sign = if offset_minutes > 0 { '+' } else { '-' };
    let abs = offset_minutes.unsigned_abs();
    let (hours, minutes) = (abs / 60, abs % 60);
    if minutes == 0 {
        format!("UTC{sign}{hours}")
    } else {
        format!("UTC{sign}{hours}:{minutes:02}")
    }
}

/// Picks a short place name for the label.
///
/// From a geocoded address such as `"10 Tampines Central 1, Tampines 529536,
/// Singapore"` it drops the country (last part) and returns the last part
/// that is not just numbers, with digits removed. Without an address the
/// free-text location description is used as is.
pub fn derive_place_label(
    address: Option<&str>,
    location_description: Option<&str>,
) -> Option<String> {
    if let Some(address) = address.map(str::trim).filter(|a| !a.is_empty()) {
        return Some(pick_place_from_address(address).unwrap_or_else(|| address.to_string()));
    }
    location_description
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}

fn pick_place_from_address(address: &str) -> Option<String> {
    let parts: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let (first, rest) = parts.split_first()?;
    let candidates = if rest.is_empty() {
        &parts[..]
    } else {
        &parts[..parts.len() - 1]
    };

    candidates
        .iter()
        .rev()
        .map(|part| strip_digits(part))
        .find(|cleaned| !cleaned.is_empty())
        .or_else(|| Some(first.to_string()))
}

fn strip_digits(part: &str) -> String {
    part.chars()
        .filter(|c| !c.is_ascii_digit())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the "reported at" line, or `None` for a missing/unparseable timestamp.
pub fn format_report_timestamp(input: &ReportTimeInput<'_>) -> Option<String> {
    let instant = DateTime::parse_from_rfc3339(input.timestamp.trim())
        .ok()?
        .with_timezone(&Utc);
    let label = input
        .label
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LABEL);

    let Some(zone) = input.time_zone.and_then(parse_time_zone) else {
        let line = format_date_time(instant, &Utc);
        return Some(format!("{label} ({DEFAULT_TIME_ZONE}): {line}"));
    };

    let line = format_date_time(instant, &zone);
    let offset = input
        .utc_offset_minutes
        .unwrap_or_else(|| utc_offset_minutes(instant, zone));
    let offset_label = format_utc_offset(offset);
    let context = match input.place_label.map(str::trim).filter(|p| !p.is_empty()) {
        Some(place) => format!("{place}, {offset_label}"),
        None => format!("Local time, {offset_label}"),
    };
    Some(format!("{label} ({context}): {line}"))
}

/// Display labels attached to a report in API responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportLabels {
    pub reported: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
}

impl ReportLabels {
    pub fn for_report(report: &Report) -> Self {
        let place = derive_place_label(
            report.address.as_deref(),
            Some(report.location_description.as_str()),
        );
        let label = |at: DateTime<Utc>, label: &str| {
            let timestamp = at.to_rfc3339();
            format_report_timestamp(&ReportTimeInput {
                timestamp: &timestamp,
                time_zone: report.time_zone.as_deref(),
                place_label: place.as_deref(),
                label: Some(label),
                ..Default::default()
            })
        };

        Self {
            reported: label(report.created_at, DEFAULT_LABEL),
            last_seen: report.last_seen_at.and_then(|at| label(at, "Last seen")),
        }
    }
}
