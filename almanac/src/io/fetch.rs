//! Upstream almanac fetch.
//!
//! The [`Fetcher`] trait decouples the pipeline from where raw records come
//! from. [`HttpFetcher`] queries the almanac API; [`FileFetcher`] replays a
//! saved response. Tests use scripted fetchers from `test_support`.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::io::config::UpstreamConfig;

/// Longest slice of an error body kept in [`FetchError::Status`].
const BODY_EXCERPT_CHARS: usize = 200;

/// Raw upstream record plus the status it was served with.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRecord {
    pub status: u16,
    pub record: Value,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed almanac body: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Source of raw almanac records.
pub trait Fetcher {
    /// Fetch the record for `date` (`YYYY-MM-DD`).
    fn fetch(&self, date: &str) -> Result<FetchedRecord, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, date: &str) -> Result<FetchedRecord, FetchError> {
        (**self).fetch(date)
    }
}

/// Fetcher backed by the almanac HTTP API.
///
/// A blocking client is built per call, so the fetcher itself is plain data and
/// can be shared across threads.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    base_url: String,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_config(cfg: &UpstreamConfig) -> Self {
        Self::new(cfg.base_url.trim(), Duration::from_secs(cfg.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(skip(self), fields(base_url = %self.base_url, timeout_secs = self.timeout.as_secs()))]
    fn fetch(&self, date: &str) -> Result<FetchedRecord, FetchError> {
        let request_error = |source| FetchError::Request {
            url: self.base_url.clone(),
            source,
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(request_error)?;

        debug!("requesting almanac");
        let response = client
            .get(&self.base_url)
            .query(&[("date", date)])
            .send()
            .map_err(request_error)?;

        let status = response.status();
        let body = response.text().map_err(request_error)?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "upstream rejected request");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let record: Value = serde_json::from_str(&body)?;
        debug!(status = status.as_u16(), bytes = body.len(), "almanac received");
        Ok(FetchedRecord {
            status: status.as_u16(),
            record,
        })
    }
}

/// Fetcher that replays a saved upstream response from disk, ignoring the date.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self, date: &str) -> Result<FetchedRecord, FetchError> {
        debug!(path = %self.path.display(), date, "reading saved almanac");
        let contents = fs::read_to_string(&self.path).map_err(|source| FetchError::Read {
            path: self.path.clone(),
            source,
        })?;
        let record: Value = serde_json::from_str(&contents)?;
        Ok(FetchedRecord {
            status: 200,
            record,
        })
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
    cut.push_str("...");
    cut
}
