//! Candidate normalization.
//!
//! # Responsibility
//! - Compute the store-wide event id from community and source-local id.
//! - Scrub placeholder venue values out of candidate locations.
//! - Shape candidates into the canonical record the store accepts.
//!
//! # Invariants
//! - An event leaving here carries either a real venue or `None`, never a
//!   placeholder or blank string.

use crate::model::event::{CandidateEvent, Event, EventKind};
use crate::resolve::text::is_placeholder_token;

/// Store-wide event id: the community name, a dash, the source-local id.
pub fn event_id(community: &str, native_id: &str) -> String {
    format!("{community}-{native_id}")
}

/// Shapes a candidate into the canonical event for `community`.
///
/// The candidate's description is carried over as the stored abstract, so
/// callers hand in the cleaned form they also used for venue resolution.
pub fn normalize_event(community: &str, candidate: CandidateEvent) -> Event {
    Event {
        id: event_id(community, &candidate.native_id),
        community: community.to_string(),
        title: candidate.title,
        registration_url: candidate.registration_url,
        kind: EventKind::Meetup,
        location: scrub_location(candidate.location),
        abstract_text: candidate.description,
        date: candidate.date,
    }
}

/// Drops blank and placeholder venue values, trimming the rest.
fn scrub_location(location: Option<String>) -> Option<String> {
    let value = location?;
    let trimmed = value.trim();
    if trimmed.is_empty() || is_placeholder_token(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn candidate(location: Option<&str>) -> CandidateEvent {
        CandidateEvent {
            native_id: "17".to_string(),
            title: "FrontendMU March session".to_string(),
            registration_url: "https://frontend.mu/meetup/17".to_string(),
            description: "Held at Coder Faculty".to_string(),
            location: location.map(str::to_string),
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        }
    }

    #[test]
    fn namespaces_id_and_keeps_fields() {
        let event = normalize_event("frontendmu", candidate(Some("Coder Faculty")));
        assert_eq!(event.id, "frontendmu-17");
        assert_eq!(event.community, "frontendmu");
        assert_eq!(event.location.as_deref(), Some("Coder Faculty"));
        assert_eq!(event.abstract_text, "Held at Coder Faculty");
        assert_eq!(event.kind, EventKind::Meetup);
        assert!(event.validate().is_ok());
    }

    #[test]
    fn scrubs_placeholder_and_blank_locations() {
        assert_eq!(normalize_event("frontendmu", candidate(Some("TBD"))).location, None);
        assert_eq!(normalize_event("frontendmu", candidate(Some(" tba "))).location, None);
        assert_eq!(normalize_event("frontendmu", candidate(Some("   "))).location, None);
        assert_eq!(normalize_event("frontendmu", candidate(None)).location, None);
        assert_eq!(
            normalize_event("frontendmu", candidate(Some(" La Plage Factory "))).location.as_deref(),
            Some("La Plage Factory")
        );
    }
}
