//! Feed retrieval over blocking HTTP.

use log::{debug, error};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

/// Upper bound on one feed download, connect included.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum FetchError {
    /// HTTP client could not be constructed.
    Build(reqwest::Error),
    /// Request failed before a response arrived (DNS, connect, timeout).
    Request { url: String, source: reqwest::Error },
    /// Server answered with a non-success status.
    Status { url: String, status: u16 },
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Build(err) => write!(f, "failed to build http client: {err}"),
            Self::Request { url, source } => write!(f, "request to `{url}` failed: {source}"),
            Self::Status { url, status } => {
                write!(f, "request to `{url}` returned status {status}")
            }
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Build(err) => Some(err),
            Self::Request { source, .. } => Some(source),
            Self::Status { .. } => None,
        }
    }
}

/// Retrieval seam between the sync pipeline and the network.
pub trait SourceFetch {
    /// Downloads the body at `url` as text.
    ///
    /// # Errors
    /// Returns `FetchError` when the request fails or the server answers
    /// with a non-success status.
    fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Production fetcher backed by a blocking `reqwest` client.
pub struct HttpSourceFetcher {
    client: reqwest::blocking::Client,
}

impl HttpSourceFetcher {
    /// Builds a fetcher with the default [`FETCH_TIMEOUT`].
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Build)?;
        Ok(Self { client })
    }
}

impl SourceFetch for HttpSourceFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let started_at = Instant::now();
        let response = self.client.get(url).send().map_err(|source| {
            error!(
                "event=source_fetch module=source status=error url={url} error_code=request_failed"
            );
            FetchError::Request {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(
                "event=source_fetch module=source status=error url={url} http_status={}",
                status.as_u16()
            );
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
        debug!(
            "event=source_fetch module=source status=ok url={url} bytes={} duration_ms={}",
            body.len(),
            started_at.elapsed().as_millis()
        );
        Ok(body)
    }
}
