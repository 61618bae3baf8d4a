//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store gateway contract consumed by reconciliation.
//! - Isolate SQLite query details from pipeline orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Event::validate()` before persistence.
//! - Row-level constraint violations are reported as `Conflict`, distinct
//!   from connection-level failures.

pub mod meetup_repo;
