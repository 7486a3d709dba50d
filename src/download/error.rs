//! Error types for the fetch-and-materialize stage.

use std::path::PathBuf;

use thiserror::Error;

use crate::cache::CacheError;
use crate::scrape::ScrapeError;

/// Errors that can occur while fetching and materializing resources.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, etc.).
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// A resource fetch returned a non-2xx status. Never retried; a
    /// partially-downloaded year is surfaced to the caller as-is.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// A scraped href could not be resolved against the base URL.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The unresolvable URL or href.
        url: String,
    },

    /// The fetched archive could not be read or extracted.
    #[error("archive error for {path}: {source}")]
    Archive {
        /// The archive path.
        path: PathBuf,
        /// The underlying ZIP error.
        #[source]
        source: zip::result::ZipError,
    },

    /// File system error during materialization.
    #[error("IO error for {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Resource location failed.
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    /// Cache write failure.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl DownloadError {
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

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an IO error with the offending path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an archive error with the offending path.
    pub fn archive(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display_carries_url_and_status() {
        let error = DownloadError::http_status("https://example.com/csv.zip", 400);
        let msg = error.to_string();
        assert!(msg.contains("400"), "Expected '400' in: {msg}");
        assert!(
            msg.contains("https://example.com/csv.zip"),
            "Expected URL in: {msg}"
        );
    }

    #[test]
    fn test_invalid_url_display() {
        let error = DownloadError::invalid_url("::not-a-url::");
        assert!(error.to_string().contains("::not-a-url::"));
    }
}
