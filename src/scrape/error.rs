//! Error types for the resource locator.

use thiserror::Error;

use crate::cache::CacheError;

/// Errors that can occur while locating survey resources.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network-level error fetching the listing page.
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The listing page returned a non-2xx status. Never retried.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The listing URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// A fiscal-year section header did not match the expected
    /// `FY NNNN` pattern. The page structure is assumed stable, so this
    /// is fatal rather than skipped.
    #[error("fiscal-year header did not match expected pattern: {header:?}")]
    HeaderPattern {
        /// The offending header text.
        header: String,
    },

    /// The cached resource map could not be interpreted.
    #[error("cached resource map is malformed: {source}")]
    ResourceMapFormat {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Cache read/write failure.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl ScrapeError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }
}
