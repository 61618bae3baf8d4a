//! Source adapters and retrieval.
//!
//! # Responsibility
//! - Parse each supported source format into candidate events.
//! - Keep the failure policy per format: calendar blocks fail locally,
//!   JSON records fail the whole batch.
//! - Own the static source registry and feed retrieval.
//!
//! # Invariants
//! - Adapters never perform venue resolution or id computation; candidates
//!   leave here with source-local identity only.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod calendar;
pub mod cnmu;
pub mod fetch;
pub mod frontendmu;
pub mod registry;

/// Error aborting an entire JSON source batch.
///
/// JSON sources are expected to be internally consistent; one malformed
/// record signals an upstream contract break, so nothing from the batch is
/// kept.
#[derive(Debug)]
pub enum JsonSourceError {
    /// Document or record failed to decode.
    Decode(serde_json::Error),
    /// A record carried a date value outside the agreed format.
    InvalidDate { native_id: String, value: String },
}

impl Display for JsonSourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode(err) => write!(f, "failed to decode source records: {err}"),
            Self::InvalidDate { native_id, value } => {
                write!(f, "invalid date `{value}` in record `{native_id}`")
            }
        }
    }
}

impl Error for JsonSourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::InvalidDate { .. } => None,
        }
    }
}

impl From<serde_json::Error> for JsonSourceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

/// Source-local record id, published as either a number or a string
/// depending on the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SourceRecordId {
    Number(i64),
    Text(String),
}

impl Display for SourceRecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}
