//! Event domain model.
//!
//! # Responsibility
//! - Define the canonical record persisted for every community event.
//! - Define the candidate shape produced by source adapters before
//!   normalization.
//!
//! # Invariants
//! - `id` is `"{community}-{native_id}"` and unique within the store.
//! - `location == None` means "resolved to unknown"; an empty string is not a
//!   legal stored value.
//! - `date` carries no time-of-day component.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Category of a canonical event.
///
/// Closed set with a stable storage codec; every current source publishes
/// meetups only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// In-person or hybrid community meetup.
    Meetup,
}

/// Canonical event record shared by all sources.
///
/// Field names mirror the persisted schema; `registration_url` and
/// `abstract_text` are renamed in serialized form to match the external
/// column naming (`registration`, `abstract`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Community-namespaced stable id, `"{community}-{native_id}"`.
    pub id: String,
    /// Source namespace the event belongs to.
    pub community: String,
    /// Display title.
    pub title: String,
    /// Canonical registration link. Unique across the store as a secondary
    /// identity guard.
    #[serde(rename = "registration")]
    pub registration_url: String,
    /// Serialized as `type` to match the persisted schema naming.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Resolved venue name. `None` when resolution ended in "unknown".
    pub location: Option<String>,
    /// Free-text description, may be empty.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Calendar date of the event.
    pub date: NaiveDate,
}

/// Validation failure for an `Event` about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    /// `id` is empty or not namespaced by `community`.
    MalformedId { id: String, community: String },
    /// A mandatory text field is empty.
    EmptyField(&'static str),
    /// `location` is present but blank.
    BlankLocation,
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedId { id, community } => {
                write!(
                    f,
                    "event id `{id}` is not namespaced by community `{community}`"
                )
            }
            Self::EmptyField(field) => write!(f, "event field `{field}` must not be empty"),
            Self::BlankLocation => write!(f, "event location must be absent instead of blank"),
        }
    }
}

impl Error for EventValidationError {}

impl Event {
    /// Checks structural invariants before persistence.
    ///
    /// # Errors
    /// - `MalformedId` when `id` does not start with `"{community}-"`.
    /// - `EmptyField` when `community`, `title`, or `registration_url` is
    ///   empty after trimming.
    /// - `BlankLocation` when `location` holds a blank string.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.community.trim().is_empty() {
            return Err(EventValidationError::EmptyField("community"));
        }
        if self.title.trim().is_empty() {
            return Err(EventValidationError::EmptyField("title"));
        }
        if self.registration_url.trim().is_empty() {
            return Err(EventValidationError::EmptyField("registration"));
        }

        let expected_prefix = format!("{}-", self.community);
        if !self.id.starts_with(expected_prefix.as_str())
            || self.id.len() == expected_prefix.len()
        {
            return Err(EventValidationError::MalformedId {
                id: self.id.clone(),
                community: self.community.clone(),
            });
        }

        if let Some(location) = self.location.as_deref() {
            if location.trim().is_empty() {
                return Err(EventValidationError::BlankLocation);
            }
        }

        Ok(())
    }
}

/// Parsed-but-unpersisted record produced by a source adapter.
///
/// Carries the source-local identity and raw description; community
/// namespacing, id computation, and placeholder scrubbing happen later in
/// the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEvent {
    /// Source-local identifier (iCalendar UID or JSON record id).
    pub native_id: String,
    /// Display title, already unescaped by the adapter.
    pub title: String,
    /// Registration link as published by the source.
    pub registration_url: String,
    /// Free-text description used for venue resolution. May be empty.
    pub description: String,
    /// Structured venue when the source supplies one; `None` leaves the
    /// field to the resolver.
    pub location: Option<String>,
    /// Event date parsed by the adapter.
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::{Event, EventKind, EventValidationError};
    use chrono::NaiveDate;

    fn valid_event() -> Event {
        Event {
            id: "cnmu-42".to_string(),
            community: "cnmu".to_string(),
            title: "Kubernetes on a shoestring".to_string(),
            registration_url: "https://cloudnativemauritius.com/meetups/42".to_string(),
            kind: EventKind::Meetup,
            location: Some("Flying Dodo".to_string()),
            abstract_text: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        }
    }

    #[test]
    fn validate_accepts_well_formed_event() {
        assert!(valid_event().validate().is_ok());
    }

    #[test]
    fn validate_rejects_id_outside_community_namespace() {
        let mut event = valid_event();
        event.id = "frontendmu-42".to_string();
        assert!(matches!(
            event.validate(),
            Err(EventValidationError::MalformedId { .. })
        ));

        event.id = "cnmu-".to_string();
        assert!(matches!(
            event.validate(),
            Err(EventValidationError::MalformedId { .. })
        ));
    }

    #[test]
    fn validate_rejects_empty_title_and_blank_location() {
        let mut event = valid_event();
        event.title = "   ".to_string();
        assert!(matches!(
            event.validate(),
            Err(EventValidationError::EmptyField("title"))
        ));

        let mut event = valid_event();
        event.location = Some("  ".to_string());
        assert!(matches!(
            event.validate(),
            Err(EventValidationError::BlankLocation)
        ));
    }
}
