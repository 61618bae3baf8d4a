//! Transactional reconciliation of one community batch.
//!
//! # Responsibility
//! - Upsert every event of a batch and, for full listings, delete the
//!   community rows absent from it.
//! - Keep row-level conflicts from poisoning the rest of the batch.
//!
//! # Invariants
//! - All writes of one call share a single immediate transaction; a failed
//!   call leaves the store untouched.
//! - Deletion is scoped to the batch community and only runs for full
//!   listings.

use crate::repo::meetup_repo::{MeetupRepository, RepoError, SqliteMeetupRepository};
use log::{error, info, warn};
use rusqlite::{Connection, TransactionBehavior};
use std::time::Instant;

use crate::model::event::Event;

/// Row counts of one reconciliation call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Rows inserted or updated.
    pub upserted: usize,
    /// Rows skipped for row-local reasons (conflict, validation).
    pub skipped: usize,
    /// Rows deleted by the full-listing sweep.
    pub deleted: usize,
}

/// Reconciles `events` into the store as the current batch for
/// `community`.
///
/// # Contract
/// - Every event must already carry the `community` namespace in its id;
///   ids of skipped rows still count as present for the sweep.
/// - `full_listing` enables deletion of community rows absent from the
///   batch. Partial feeds must pass `false`.
///
/// # Errors
/// Row-local failures (`Conflict`, `Validation`) are logged, counted as
/// skipped, and do not fail the call. Any other `RepoError` aborts and
/// rolls back the whole batch.
pub fn reconcile(
    conn: &mut Connection,
    community: &str,
    events: &[Event],
    full_listing: bool,
) -> Result<ReconcileReport, RepoError> {
    let started_at = Instant::now();
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut report = ReconcileReport::default();
    {
        let repo = SqliteMeetupRepository::try_new(&tx)?;
        for event in events {
            match repo.upsert(event) {
                Ok(()) => report.upserted += 1,
                Err(RepoError::Conflict(detail)) => {
                    warn!(
                        "event=reconcile_row_skipped module=service community={community} id={} reason=conflict detail={detail}",
                        event.id
                    );
                    report.skipped += 1;
                }
                Err(RepoError::Validation(detail)) => {
                    warn!(
                        "event=reconcile_row_skipped module=service community={community} id={} reason=validation detail={detail}",
                        event.id
                    );
                    report.skipped += 1;
                }
                Err(err) => {
                    error!(
                        "event=reconcile module=service status=error community={community} error_code=reconcile_failed"
                    );
                    return Err(err);
                }
            }
        }

        if full_listing {
            let keep_ids: Vec<String> = events.iter().map(|event| event.id.clone()).collect();
            report.deleted = repo.delete_community_except(community, &keep_ids)?;
        }
    }
    tx.commit()?;

    info!(
        "event=reconcile module=service status=ok community={community} upserted={} skipped={} deleted={} duration_ms={}",
        report.upserted,
        report.skipped,
        report.deleted,
        started_at.elapsed().as_millis()
    );
    Ok(report)
}
