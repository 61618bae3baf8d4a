//! Static registry of configured sources.
//!
//! # Responsibility
//! - Load source descriptors from a JSON registry file.
//! - Validate descriptor names and reject duplicates.
//! - Resolve a community selector to the set of sources to sync.
//!
//! # Invariants
//! - Names are unique, non-empty, and use a stable machine-safe charset.
//! - Iteration order is deterministic (sorted by name).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Selector value that expands to every calendar-format source.
pub const ALL_CALENDARS_SELECTOR: &str = "MEETUPCOM";

/// Wire format of a source feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Calendar,
    Frontendmu,
    Cnmu,
}

/// Declarative description of one configured source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub url: String,
    pub format: SourceFormat,
    /// Whether the feed carries the complete current listing. Only such
    /// feeds may drive deletion of absent rows.
    #[serde(default)]
    pub full_listing: bool,
}

/// Error raised while loading or querying the registry.
#[derive(Debug)]
pub enum RegistryError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    InvalidSourceName(String),
    DuplicateSourceName(String),
    SourceNotFound(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read registry file `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse registry JSON: {err}"),
            Self::InvalidSourceName(name) => write!(f, "invalid source name: `{name}`"),
            Self::DuplicateSourceName(name) => write!(f, "duplicate source name: `{name}`"),
            Self::SourceNotFound(name) => write!(f, "source not found: `{name}`"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

/// In-memory registry keyed by source name.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: BTreeMap<String, SourceSpec>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from the JSON array used by the registry file.
    ///
    /// # Errors
    /// Returns `RegistryError::Parse` for malformed JSON and the name
    /// validation errors of [`SourceRegistry::register`].
    pub fn from_json_str(raw: &str) -> Result<Self, RegistryError> {
        let specs: Vec<SourceSpec> = serde_json::from_str(raw).map_err(RegistryError::Parse)?;
        let mut registry = Self::new();
        for spec in specs {
            registry.register(spec)?;
        }
        Ok(registry)
    }

    /// Reads and parses the registry file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Registers one source descriptor.
    ///
    /// # Errors
    /// - `RegistryError::InvalidSourceName` when the name is empty or uses
    ///   characters outside `[a-z0-9_-]`.
    /// - `RegistryError::DuplicateSourceName` when the name is taken.
    pub fn register(&mut self, mut spec: SourceSpec) -> Result<(), RegistryError> {
        let name = spec.name.trim().to_string();
        if !is_valid_source_name(&name) {
            return Err(RegistryError::InvalidSourceName(spec.name));
        }
        if self.sources.contains_key(&name) {
            return Err(RegistryError::DuplicateSourceName(spec.name));
        }
        spec.name = name.clone();
        self.sources.insert(name, spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SourceSpec> {
        self.sources.get(name.trim())
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    /// Every source published as an iCalendar feed.
    pub fn calendar_sources(&self) -> Vec<&SourceSpec> {
        self.sources
            .values()
            .filter(|spec| spec.format == SourceFormat::Calendar)
            .collect()
    }

    /// Expands a community selector into concrete sources.
    ///
    /// # Contract
    /// - [`ALL_CALENDARS_SELECTOR`] selects every calendar-format source,
    ///   possibly none.
    /// - Any other value must name a registered source exactly.
    pub fn select(&self, selector: &str) -> Result<Vec<&SourceSpec>, RegistryError> {
        if selector == ALL_CALENDARS_SELECTOR {
            return Ok(self.calendar_sources());
        }
        match self.get(selector) {
            Some(spec) => Ok(vec![spec]),
            None => Err(RegistryError::SourceNotFound(selector.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

fn is_valid_source_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
