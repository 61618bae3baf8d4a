//! iCalendar source adapter.
//!
//! # Responsibility
//! - Unfold RFC 5545 physical lines and split the feed into `VEVENT` blocks.
//! - Extract title, start date, registration URL, and native id per block.
//! - Report per-block failures without aborting the rest of the feed.
//!
//! # Invariants
//! - A malformed block never removes other blocks from the batch.
//! - Unmatched `BEGIN`/`END` markers are ignored, never an error.
//! - Titles are unescaped here; descriptions travel raw and are cleaned by
//!   the resolver preprocessing.

use crate::model::event::CandidateEvent;
use crate::resolve::text::unescape_text;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

const BEGIN_EVENT_MARKER: &str = "BEGIN:VEVENT";
const END_EVENT_MARKER: &str = "END:VEVENT";

/// Failure local to one event block. `index` is the zero-based position of
/// the block within the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    MissingProperty { index: usize, property: &'static str },
    InvalidDate { index: usize, value: String },
}

impl Display for BlockError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingProperty { index, property } => {
                write!(f, "calendar block {index} is missing required property {property}")
            }
            Self::InvalidDate { index, value } => {
                write!(f, "calendar block {index} has invalid start date `{value}`")
            }
        }
    }
}

impl Error for BlockError {}

/// Outcome of one calendar parse: the usable candidates plus the block
/// failures encountered along the way.
#[derive(Debug, Default)]
pub struct CalendarParse {
    pub candidates: Vec<CandidateEvent>,
    pub errors: Vec<BlockError>,
}

/// Parses an iCalendar feed into candidate events.
///
/// # Contract
/// - Never fails as a whole; broken blocks land in `errors`.
/// - Requires `SUMMARY`, `DTSTART`, `URL`, and `UID` per block;
///   `DESCRIPTION` is optional and defaults to empty.
pub fn parse_calendar(raw: &str) -> CalendarParse {
    let lines = unfold_lines(raw);
    let blocks = split_event_blocks(&lines);

    let mut parse = CalendarParse::default();
    for (index, block) in blocks.into_iter().enumerate() {
        match parse_event_block(index, block) {
            Ok(candidate) => parse.candidates.push(candidate),
            Err(err) => parse.errors.push(err),
        }
    }
    parse
}

/// Rejoins folded physical lines: a line starting with one space or tab
/// continues the previous line with that first character stripped.
fn unfold_lines(raw: &str) -> Vec<String> {
    let mut unfolded: Vec<String> = Vec::new();
    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix(' ').or_else(|| line.strip_prefix('\t')) {
            if let Some(last) = unfolded.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        unfolded.push(line.to_string());
    }
    unfolded
}

/// Collects the content lines between each `BEGIN:VEVENT` and the next
/// `END:VEVENT`. A `BEGIN` while already inside a block and an `END`
/// outside any block are both treated as stray marker lines.
fn split_event_blocks(lines: &[String]) -> Vec<&[String]> {
    let mut blocks = Vec::new();
    let mut block_start: Option<usize> = None;
    for (index, line) in lines.iter().enumerate() {
        match line.trim() {
            BEGIN_EVENT_MARKER => {
                if block_start.is_none() {
                    block_start = Some(index + 1);
                }
            }
            END_EVENT_MARKER => {
                if let Some(start) = block_start.take() {
                    blocks.push(&lines[start..index]);
                }
            }
            _ => {}
        }
    }
    blocks
}

fn parse_event_block(index: usize, lines: &[String]) -> Result<CandidateEvent, BlockError> {
    let title = required_property(index, lines, "SUMMARY")?;
    let date_text = required_property(index, lines, "DTSTART")?;
    let registration_url = required_property(index, lines, "URL")?;
    let native_id = required_property(index, lines, "UID")?;
    let description = property_value(lines, "DESCRIPTION").unwrap_or_default();

    let date = parse_start_date(&date_text).ok_or_else(|| BlockError::InvalidDate {
        index,
        value: date_text.clone(),
    })?;

    Ok(CandidateEvent {
        native_id,
        title: unescape_text(&title),
        registration_url,
        description,
        location: None,
        date,
    })
}

fn required_property(
    index: usize,
    lines: &[String],
    property: &'static str,
) -> Result<String, BlockError> {
    property_value(lines, property)
        .filter(|value| !value.is_empty())
        .ok_or(BlockError::MissingProperty { index, property })
}

/// First value of the named property, parameters stripped. Matches both
/// the bare form (`DTSTART:...`) and the parameterized one
/// (`DTSTART;TZID=...:...`).
fn property_value(lines: &[String], property: &str) -> Option<String> {
    lines.iter().find_map(|line| {
        let (prefix, value) = line.trim().split_once(':')?;
        let name = prefix.split(';').next().unwrap_or(prefix);
        if name == property {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}

/// Parses the date component of a `DTSTART` value. Anything after a `T` is
/// a local time and does not participate in identity or ordering.
fn parse_start_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.split('T').next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfolds_continuation_lines() {
        let raw = "DESCRIPTION:A very long\r\n  description line\r\nSUMMARY:Short";
        let lines = unfold_lines(raw);
        assert_eq!(lines, vec!["DESCRIPTION:A very long description line", "SUMMARY:Short"]);
    }

    #[test]
    fn property_lookup_strips_parameters() {
        let lines = vec![
            "DTSTART;TZID=Indian/Mauritius:20250314T180000".to_string(),
            "URL;VALUE=URI:https://example.test/e/1".to_string(),
        ];
        assert_eq!(property_value(&lines, "DTSTART").as_deref(), Some("20250314T180000"));
        assert_eq!(
            property_value(&lines, "URL").as_deref(),
            Some("https://example.test/e/1")
        );
        assert_eq!(property_value(&lines, "SUMMARY"), None);
    }

    #[test]
    fn start_date_ignores_time_component() {
        assert_eq!(
            parse_start_date("20250314T180000"),
            NaiveDate::from_ymd_opt(2025, 3, 14)
        );
        assert_eq!(parse_start_date("20250314"), NaiveDate::from_ymd_opt(2025, 3, 14));
        assert_eq!(parse_start_date("2025-03-14"), None);
    }
}
