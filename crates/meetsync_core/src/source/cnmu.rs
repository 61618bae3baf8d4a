//! Cloud Native Mauritius JSON source adapter.
//!
//! Records arrive fully formed: title, registration URL, venue, abstract,
//! and date are all published by the API, so the mapping is field by field
//! with no derived values.

use crate::model::event::CandidateEvent;
use crate::source::{JsonSourceError, SourceRecordId};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CnmuRecord {
    id: SourceRecordId,
    title: String,
    url: String,
    location: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    date: String,
}

/// Parses the Cloud Native Mauritius feed into candidate events.
///
/// # Errors
/// Any malformed record aborts the whole batch with `JsonSourceError`.
pub fn parse_cnmu(raw: &str) -> Result<Vec<CandidateEvent>, JsonSourceError> {
    let records: Vec<CnmuRecord> = serde_json::from_str(raw)?;
    records.into_iter().map(candidate_from_record).collect()
}

fn candidate_from_record(record: CnmuRecord) -> Result<CandidateEvent, JsonSourceError> {
    let native_id = record.id.to_string();
    let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").map_err(|_| {
        JsonSourceError::InvalidDate {
            native_id: native_id.clone(),
            value: record.date.clone(),
        }
    })?;

    Ok(CandidateEvent {
        title: record.title,
        registration_url: record.url,
        description: record.abstract_text.unwrap_or_default(),
        location: record.location.filter(|venue| !venue.trim().is_empty()),
        native_id,
        date,
    })
}
