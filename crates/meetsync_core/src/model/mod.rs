//! Canonical domain model for community event listings.
//!
//! # Responsibility
//! - Define the persisted `Event` record and the adapter-level
//!   `CandidateEvent` it is normalized from.
//! - Keep one storage shape for every source format.
//!
//! # Invariants
//! - Every persisted event is identified by a community-namespaced string id.
//! - A missing location is represented as `None`, never as a placeholder
//!   string.

pub mod event;
