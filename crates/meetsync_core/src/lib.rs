//! Core domain logic for MeetSync.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod repo;
pub mod resolve;
pub mod service;
pub mod source;

pub use config::{AppConfig, ConfigError, OllamaConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::{CandidateEvent, Event, EventKind, EventValidationError};
pub use normalize::{event_id, normalize_event};
pub use repo::meetup_repo::{MeetupRepository, RepoError, RepoResult, SqliteMeetupRepository};
pub use resolve::text::clean_description;
pub use resolve::{
    InferenceClient, MokaVenueCache, OllamaChatClient, Resolution, ResolveError, VenueCache,
    VenueResolver,
};
pub use service::reconcile::{reconcile, ReconcileReport};
pub use service::sync_service::{
    run_selector, RunSummary, SourceFailure, SyncError, SyncReport, SyncService,
};
pub use source::calendar::{parse_calendar, BlockError, CalendarParse};
pub use source::cnmu::parse_cnmu;
pub use source::fetch::{FetchError, HttpSourceFetcher, SourceFetch, FETCH_TIMEOUT};
pub use source::frontendmu::parse_frontendmu;
pub use source::registry::{
    RegistryError, SourceFormat, SourceRegistry, SourceSpec, ALL_CALENDARS_SELECTOR,
};
pub use source::JsonSourceError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
