//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate adapters, resolver, and repository into batch use cases.
//! - Keep CLI and HTTP layers decoupled from storage and transport details.

pub mod reconcile;
pub mod sync_service;
