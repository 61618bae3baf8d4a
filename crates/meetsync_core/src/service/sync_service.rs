//! Batch synchronization pipeline.
//!
//! # Responsibility
//! - Drive one source through fetch, parse, venue resolution,
//!   normalization, and reconciliation.
//! - Run a selector's sources in sequence and collect per-source outcomes.
//! - Compose the production pipeline from configuration.
//!
//! # Invariants
//! - Sources are independent: one failed source never stops the others.
//! - Venue resolution failures degrade the event to "no venue", they never
//!   fail the batch.
//! - Descriptions are cleaned exactly once, before resolution, and the
//!   cleaned form is what gets persisted as the abstract.

use crate::config::AppConfig;
use crate::db::{open_db, DbError};
use crate::model::event::Event;
use crate::normalize::normalize_event;
use crate::repo::meetup_repo::RepoError;
use crate::resolve::text::clean_description;
use crate::resolve::{
    InferenceClient, MokaVenueCache, OllamaChatClient, Resolution, ResolveError, VenueCache,
    VenueResolver,
};
use crate::service::reconcile::{reconcile, ReconcileReport};
use crate::source::calendar::parse_calendar;
use crate::source::cnmu::parse_cnmu;
use crate::source::fetch::{FetchError, HttpSourceFetcher, SourceFetch};
use crate::source::frontendmu::parse_frontendmu;
use crate::source::registry::{RegistryError, SourceFormat, SourceRegistry, SourceSpec};
use crate::source::JsonSourceError;
use log::{error, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Failure of one source sync, or of assembling the pipeline itself.
#[derive(Debug)]
pub enum SyncError {
    Registry(RegistryError),
    Fetch(FetchError),
    Json(JsonSourceError),
    Db(DbError),
    Repo(RepoError),
    Inference(ResolveError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registry(err) => write!(f, "registry error: {err}"),
            Self::Fetch(err) => write!(f, "fetch error: {err}"),
            Self::Json(err) => write!(f, "source decode error: {err}"),
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Repo(err) => write!(f, "repository error: {err}"),
            Self::Inference(err) => write!(f, "inference error: {err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Registry(err) => Some(err),
            Self::Fetch(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Inference(err) => Some(err),
        }
    }
}

impl From<RegistryError> for SyncError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<FetchError> for SyncError {
    fn from(value: FetchError) -> Self {
        Self::Fetch(value)
    }
}

impl From<JsonSourceError> for SyncError {
    fn from(value: JsonSourceError) -> Self {
        Self::Json(value)
    }
}

impl From<DbError> for SyncError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ResolveError> for SyncError {
    fn from(value: ResolveError) -> Self {
        Self::Inference(value)
    }
}

/// Per-source outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub source: String,
    /// Candidates that entered the pipeline after source-side filtering.
    pub parsed: usize,
    /// Calendar blocks dropped for local errors. Always zero for JSON
    /// sources.
    pub block_errors: usize,
    /// Events that ended up with a venue.
    pub resolved: usize,
    /// Events persisted without a venue.
    pub unresolved: usize,
    pub reconcile: ReconcileReport,
}

/// A source that failed as a whole.
#[derive(Debug)]
pub struct SourceFailure {
    pub source: String,
    pub error: SyncError,
}

/// Aggregate outcome of a run over one or more sources.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<SyncReport>,
    pub failures: Vec<SourceFailure>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Synchronization pipeline over injectable fetch, inference, and cache
/// seams.
pub struct SyncService<F, C, K> {
    fetcher: F,
    resolver: VenueResolver<C, K>,
}

impl<F, C, K> SyncService<F, C, K>
where
    F: SourceFetch,
    C: InferenceClient,
    K: VenueCache,
{
    pub fn new(fetcher: F, resolver: VenueResolver<C, K>) -> Self {
        Self { fetcher, resolver }
    }

    /// Synchronizes one source end to end.
    ///
    /// # Contract
    /// - Calendar block errors are logged and counted, never fatal.
    /// - A JSON decode failure aborts this source before any write.
    /// - The reconciliation of the batch happens in one transaction.
    ///
    /// # Errors
    /// Returns `SyncError` when fetch, decode, or reconciliation fails;
    /// the store then still holds the previous state for this community.
    pub fn sync_source(
        &self,
        conn: &mut Connection,
        spec: &SourceSpec,
    ) -> Result<SyncReport, SyncError> {
        let started_at = Instant::now();
        let body = self.fetcher.fetch_text(&spec.url)?;

        let (mut candidates, block_errors) = match spec.format {
            SourceFormat::Calendar => {
                let parse = parse_calendar(&body);
                for err in &parse.errors {
                    warn!(
                        "event=calendar_block_skipped module=service source={} detail={err}",
                        spec.name
                    );
                }
                (parse.candidates, parse.errors.len())
            }
            SourceFormat::Frontendmu => (parse_frontendmu(&body)?, 0),
            SourceFormat::Cnmu => (parse_cnmu(&body)?, 0),
        };

        for candidate in &mut candidates {
            candidate.description = clean_description(&candidate.description);
            if candidate.location.is_some() || candidate.description.is_empty() {
                continue;
            }
            match self.resolver.resolve(&candidate.description) {
                Ok(Resolution::Venue(venue)) => candidate.location = Some(venue),
                Ok(Resolution::Unknown) => {}
                Err(err) => {
                    warn!(
                        "event=venue_resolve module=service status=error source={} id={} detail={err}",
                        spec.name, candidate.native_id
                    );
                }
            }
        }

        let events: Vec<Event> = candidates
            .into_iter()
            .map(|candidate| normalize_event(&spec.name, candidate))
            .collect();
        let resolved = events.iter().filter(|event| event.location.is_some()).count();
        let unresolved = events.len() - resolved;

        let reconcile_report = reconcile(conn, &spec.name, &events, spec.full_listing)?;

        info!(
            "event=sync_source module=service status=ok source={} parsed={} block_errors={} resolved={} unresolved={} duration_ms={}",
            spec.name,
            events.len(),
            block_errors,
            resolved,
            unresolved,
            started_at.elapsed().as_millis()
        );
        Ok(SyncReport {
            source: spec.name.clone(),
            parsed: events.len(),
            block_errors,
            resolved,
            unresolved,
            reconcile: reconcile_report,
        })
    }

    /// Runs every source in order, collecting failures instead of
    /// stopping at the first one.
    pub fn sync_all(&self, conn: &mut Connection, sources: &[&SourceSpec]) -> RunSummary {
        let mut summary = RunSummary::default();
        for spec in sources {
            match self.sync_source(conn, spec) {
                Ok(report) => summary.reports.push(report),
                Err(error) => {
                    error!(
                        "event=sync_source module=service status=error source={} error_code=sync_failed detail={error}",
                        spec.name
                    );
                    summary.failures.push(SourceFailure {
                        source: spec.name.clone(),
                        error,
                    });
                }
            }
        }
        summary
    }
}

/// Composes the production pipeline and runs the sources named by
/// `selector`.
///
/// # Errors
/// Fails before any source runs when the registry, database, or one of
/// the clients cannot be set up. Per-source failures land in the returned
/// summary instead.
pub fn run_selector(config: &AppConfig, selector: &str) -> Result<RunSummary, SyncError> {
    let registry = SourceRegistry::load(&config.sources_path)?;
    let sources = registry.select(selector)?;
    let mut conn = open_db(&config.db_path)?;

    let fetcher = HttpSourceFetcher::new()?;
    let client = OllamaChatClient::new(&config.ollama)?;
    let service = SyncService::new(fetcher, VenueResolver::new(client, MokaVenueCache::new()));
    Ok(service.sync_all(&mut conn, &sources))
}
