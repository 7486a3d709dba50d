//! Public Libraries Survey acquisition library.
//!
//! This library fetches the yearly IMLS Public Libraries Survey release
//! (an HTML listing page, a ZIP of CSV tables, and a PDF codebook) and
//! turns it into queryable tabular data with human-readable column names.
//!
//! # Architecture
//!
//! The pipeline is strictly sequential; each stage writes through the
//! on-disk cache so every step is idempotent and resumable:
//! - [`scrape`] - locates per-year resources on the survey listing page
//! - [`download`] - fetches, unzips, and materializes canonical datafiles
//! - [`pdf`] - mines the codebook PDF for variable definitions
//! - [`variables`] - the recursive taxonomy used to rename short codes
//! - [`transform`] - applies a flattened taxonomy to dataset columns
//! - [`stats`] - the query surface over the materialized datafiles

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod cache;
pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod pdf;
pub mod scrape;
pub mod stats;
pub mod table;
pub mod transform;
pub mod variables;

// Re-export commonly used types
pub use cache::{CacheError, OnDiskCache};
pub use client::PublicLibrariesSurvey;
pub use config::Config;
pub use download::{DatafileType, DownloadError, DownloadResource, DownloadService};
pub use error::PlsError;
pub use pdf::{ExtractionError, ExtractionService, VariableRecord, VariableTable};
pub use scrape::{ResourceMap, Scrape, ScrapeError, ScrapingService};
pub use stats::{StatsError, StatsService};
pub use table::{DataTable, TableError};
pub use transform::TransformationService;
pub use variables::{VariableRepository, Variables};
