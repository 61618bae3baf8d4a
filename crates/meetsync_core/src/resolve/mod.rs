//! Venue resolution.
//!
//! # Responsibility
//! - Clean raw description text into its canonical inference form.
//! - Resolve venue names from cleaned text, consulting the cache first.
//! - Guard every inference reply against placeholder values.
//!
//! # Invariants
//! - The cache key is the cleaned description, byte for byte.
//! - Only `Venue` and `Unknown` outcomes are cached; failures are retried
//!   on the next occurrence of the text.
//! - A placeholder or blank reply downgrades to `Unknown` and is never
//!   stored as a venue.

use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod cache;
pub mod ollama;
pub mod text;

pub use cache::{MokaVenueCache, VenueCache, VENUE_CACHE_CAPACITY};
pub use ollama::{InferenceClient, OllamaChatClient, INFERENCE_TIMEOUT};

use text::is_placeholder_token;

/// Outcome of venue resolution for one description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A concrete venue name.
    Venue(String),
    /// The text carries no usable venue.
    Unknown,
}

/// Failure of the inference call itself, distinct from an unknown venue.
#[derive(Debug)]
pub enum ResolveError {
    /// Inference client could not be constructed.
    Build(reqwest::Error),
    /// Request failed before a usable response arrived.
    Request(reqwest::Error),
    /// Inference endpoint answered with a non-success status.
    Status { status: u16 },
    /// Reply content was not the agreed JSON shape.
    MalformedReply(String),
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Build(err) => write!(f, "failed to build inference client: {err}"),
            Self::Request(err) => write!(f, "inference request failed: {err}"),
            Self::Status { status } => {
                write!(f, "inference endpoint returned status {status}")
            }
            Self::MalformedReply(snippet) => {
                write!(f, "inference reply is not valid venue JSON: `{snippet}`")
            }
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Build(err) | Self::Request(err) => Some(err),
            _ => None,
        }
    }
}

/// Caching venue resolver over an inference client.
pub struct VenueResolver<C, K> {
    client: C,
    cache: K,
}

impl<C: InferenceClient, K: VenueCache> VenueResolver<C, K> {
    pub fn new(client: C, cache: K) -> Self {
        Self { client, cache }
    }

    /// Resolves a venue from cleaned description text.
    ///
    /// # Contract
    /// - `description` must already be in the form produced by
    ///   [`text::clean_description`]; it doubles as the cache key.
    /// - Empty text short-circuits to `Unknown` without touching the
    ///   inference client.
    ///
    /// # Errors
    /// Propagates `ResolveError` from the inference client. The failed
    /// text is not cached.
    pub fn resolve(&self, description: &str) -> Result<Resolution, ResolveError> {
        if description.is_empty() {
            return Ok(Resolution::Unknown);
        }
        if let Some(hit) = self.cache.get(description) {
            debug!("event=venue_resolve module=resolve status=ok cache=hit");
            return Ok(hit);
        }

        let resolution = match self.client.infer_venue(description)? {
            Some(venue) if !venue.trim().is_empty() && !is_placeholder_token(&venue) => {
                Resolution::Venue(venue.trim().to_string())
            }
            _ => Resolution::Unknown,
        };
        self.cache.put(description, resolution.clone());
        debug!("event=venue_resolve module=resolve status=ok cache=miss");
        Ok(resolution)
    }
}
