//! Batch synchronization entry point.
//!
//! # Responsibility
//! - Compose configuration, logging, and the sync pipeline for one run.
//! - Map the run outcome to a process exit code for schedulers.

use meetsync_core::{init_logging, run_selector, AppConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("meetsync: invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("meetsync: logging setup failed: {err}");
        return ExitCode::FAILURE;
    }

    match run_selector(&config, &config.community) {
        Ok(summary) => {
            for report in &summary.reports {
                println!(
                    "{}: parsed={} resolved={} unresolved={} upserted={} skipped={} deleted={}",
                    report.source,
                    report.parsed,
                    report.resolved,
                    report.unresolved,
                    report.reconcile.upserted,
                    report.reconcile.skipped,
                    report.reconcile.deleted
                );
            }
            for failure in &summary.failures {
                eprintln!("{}: failed: {}", failure.source, failure.error);
            }
            if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("meetsync: sync failed: {err}");
            ExitCode::FAILURE
        }
    }
}
