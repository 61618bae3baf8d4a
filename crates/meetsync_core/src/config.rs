//! Process configuration.
//!
//! # Responsibility
//! - Read every runtime setting from the environment exactly once.
//! - Apply stable defaults so a bare environment still yields a working
//!   local setup.
//!
//! # Invariants
//! - Configuration is immutable after construction and passed explicitly;
//!   no module reads the environment on its own.
//! - `log_dir` is always absolute.

use crate::source::registry::ALL_CALENDARS_SELECTOR;
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "meetsync.db";
const DEFAULT_OLLAMA_URL: &str = "http://localhost";
const DEFAULT_OLLAMA_PORT: u16 = 11434;
const DEFAULT_OLLAMA_MODEL: &str = "mistral";
const DEFAULT_SOURCES_PATH: &str = "communities.json";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Ollama endpoint coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    /// Base URL without port, e.g. `http://localhost`.
    pub url: String,
    pub port: u16,
    pub model: String,
}

/// Immutable process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub ollama: OllamaConfig,
    /// Active-source selector for calendar sync: a registry entry name or
    /// the all-calendars value.
    pub community: String,
    /// Path to the source registry JSON file.
    pub sources_path: PathBuf,
    /// Absolute directory for log files.
    pub log_dir: PathBuf,
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    /// An environment value that must be numeric is not.
    InvalidNumber { key: &'static str, value: String },
    /// The current directory is needed to anchor a relative log directory
    /// but cannot be determined.
    CurrentDir(std::io::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { key, value } => {
                write!(f, "environment value for {key} is not a number: `{value}`")
            }
            Self::CurrentDir(err) => {
                write!(f, "failed to determine current directory: {err}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CurrentDir(err) => Some(err),
            Self::InvalidNumber { .. } => None,
        }
    }
}

impl AppConfig {
    /// Reads configuration from the environment, applying defaults for
    /// every missing or empty key. `COMMUNITY` defaults to the
    /// all-calendars selector.
    ///
    /// # Errors
    /// Returns `ConfigError` for non-numeric port values or when a
    /// relative log directory cannot be anchored to the current directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let ollama = OllamaConfig {
            url: env_or("OLLAMA_URL", DEFAULT_OLLAMA_URL),
            port: port_from_env("OLLAMA_PORT", DEFAULT_OLLAMA_PORT)?,
            model: env_or("OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
        };
        Ok(Self {
            db_path: PathBuf::from(env_or("MEETSYNC_DB_PATH", DEFAULT_DB_PATH)),
            ollama,
            community: env_or("COMMUNITY", ALL_CALENDARS_SELECTOR),
            sources_path: PathBuf::from(env_or("MEETSYNC_SOURCES", DEFAULT_SOURCES_PATH)),
            log_dir: absolute_log_dir(env_or("MEETSYNC_LOG_DIR", DEFAULT_LOG_DIR))?,
            log_level: env_or("MEETSYNC_LOG_LEVEL", DEFAULT_LOG_LEVEL),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn port_from_env(key: &'static str, default: u16) -> Result<u16, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        _ => Ok(default),
    }
}

/// Anchors a relative log directory to the current working directory.
fn absolute_log_dir(dir: String) -> Result<PathBuf, ConfigError> {
    let path = PathBuf::from(dir);
    if path.is_absolute() {
        return Ok(path);
    }
    let base = env::current_dir().map_err(ConfigError::CurrentDir)?;
    Ok(base.join(path))
}
