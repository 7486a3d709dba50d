//! Crate-level error type.

use thiserror::Error;

use crate::cache::CacheError;
use crate::download::DownloadError;
use crate::pdf::ExtractionError;
use crate::scrape::ScrapeError;
use crate::stats::StatsError;
use crate::table::TableError;

/// Any error surfaced by the survey client.
#[derive(Debug, Error)]
pub enum PlsError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Stats(#[from] StatsError),
}
