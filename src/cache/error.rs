//! Error types for the on-disk cache.

use std::path::PathBuf;

use thiserror::Error;

use crate::table::TableError;

/// Errors that can occur reading or writing cached resources.
///
/// A cache *miss* is never an error; `get_*` accessors return `Ok(None)`
/// for missing paths. Malformed content on read is fatal and not retried.
#[derive(Debug, Error)]
pub enum CacheError {
    /// File system error (create, read, write, remove, rename).
    #[error("IO error for cache path {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A cached structured document could not be deserialized.
    #[error("malformed cached document at {path}: {source}")]
    MalformedDocument {
        /// The offending cache path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A cached tabular resource could not be parsed.
    #[error("malformed cached table at {path}: {source}")]
    MalformedTable {
        /// The offending cache path.
        path: PathBuf,
        /// The underlying table error.
        #[source]
        source: TableError,
    },
}

impl CacheError {
    /// Creates an IO error with the offending path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
