//! frontend.mu JSON source adapter.
//!
//! # Responsibility
//! - Decode the published meetup records.
//! - Drop records closed for registration before any mapping.
//! - Derive the registration URL and the display title per record.

use crate::model::event::CandidateEvent;
use crate::source::{JsonSourceError, SourceRecordId};
use chrono::NaiveDate;
use serde::Deserialize;

const REGISTRATION_BASE_URL: &str = "https://frontend.mu/meetup";
const TITLE_PREFIX: &str = "FrontendMU";

#[derive(Debug, Deserialize)]
struct FrontendmuRecord {
    id: SourceRecordId,
    title: String,
    #[serde(rename = "Date")]
    date: String,
    /// Venue field in the upstream payload. Absent or empty means the venue
    /// has to come from elsewhere.
    #[serde(rename = "Venue", default)]
    venue: Option<String>,
    /// Missing flag counts as open; the upstream feed only sets it when a
    /// meetup is explicitly closed.
    #[serde(default = "default_accepting_rsvp")]
    accepting_rsvp: bool,
}

fn default_accepting_rsvp() -> bool {
    true
}

/// Parses the frontend.mu feed into candidate events.
///
/// # Errors
/// Any malformed record aborts the whole batch with `JsonSourceError`.
pub fn parse_frontendmu(raw: &str) -> Result<Vec<CandidateEvent>, JsonSourceError> {
    let records: Vec<FrontendmuRecord> = serde_json::from_str(raw)?;
    records
        .into_iter()
        .filter(|record| record.accepting_rsvp)
        .map(candidate_from_record)
        .collect()
}

fn candidate_from_record(record: FrontendmuRecord) -> Result<CandidateEvent, JsonSourceError> {
    let native_id = record.id.to_string();
    let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").map_err(|_| {
        JsonSourceError::InvalidDate {
            native_id: native_id.clone(),
            value: record.date.clone(),
        }
    })?;

    Ok(CandidateEvent {
        title: format!("{TITLE_PREFIX} {}", record.title),
        registration_url: format!("{REGISTRATION_BASE_URL}/{native_id}"),
        description: String::new(),
        location: record.venue.filter(|venue| !venue.trim().is_empty()),
        native_id,
        date,
    })
}
