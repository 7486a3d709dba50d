//! Error types for codebook mining.

use std::path::PathBuf;

use thiserror::Error;

use crate::cache::CacheError;

/// Errors that can occur extracting variables from the codebook PDF.
///
/// A *missing* codebook is not represented here: extraction returns
/// `Ok(None)` so downstream consumers can degrade to raw column names.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The PDF could not be loaded or its text could not be extracted.
    #[error("PDF error for {path}: {source}")]
    Pdf {
        /// The codebook path.
        path: PathBuf,
        /// The underlying lopdf failure.
        #[source]
        source: lopdf::Error,
    },

    /// A cached variable table does not have the expected columns.
    #[error("cached variable table {resource} is missing column {column:?}")]
    MalformedVariableTable {
        /// The cache resource path.
        resource: String,
        /// The missing column.
        column: &'static str,
    },

    /// Cache read/write failure.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl ExtractionError {
    /// Creates a PDF error with the offending path.
    pub fn pdf(path: impl Into<PathBuf>, source: lopdf::Error) -> Self {
        Self::Pdf {
            path: path.into(),
            source,
        }
    }
}
