//! Reading the survey datasets and their documentation.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{instrument, warn};

use crate::cache::{CacheError, OnDiskCache};
use crate::config::Config;
use crate::download::DatafileType;
use crate::pdf::ExtractionError;
use crate::table::{DataTable, TableError};
use crate::transform::TransformationService;
use crate::variables::VariableRepository;

/// Errors reading survey statistics.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The requested datafile was never downloaded.
    #[error("no {kind} datafile at {path}; run the download first")]
    MissingDatafile { kind: DatafileType, path: PathBuf },

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Serves the downloaded datasets with optional renaming and projection.
pub struct StatsService {
    config: Config,
    cache: Arc<OnDiskCache>,
    transformer: TransformationService,
    repository: Arc<VariableRepository>,
}

impl StatsService {
    #[must_use]
    pub fn new(
        config: Config,
        cache: Arc<OnDiskCache>,
        transformer: TransformationService,
        repository: Arc<VariableRepository>,
    ) -> Self {
        Self {
            config,
            cache,
            transformer,
            repository,
        }
    }

    /// Loads the dataset for `kind`, renaming columns per the taxonomy
    /// when configured and projecting to `columns` when non-empty.
    ///
    /// A missing datafile is a hard error; the caller must download first.
    #[instrument(skip(self))]
    pub fn get_stats(&self, kind: DatafileType, columns: &[&str]) -> Result<DataTable, StatsError> {
        let filename = kind.filename();
        let Some(mut table) = self.cache.get_table(filename)? else {
            return Err(StatsError::MissingDatafile {
                kind,
                path: self.cache.full_path(filename),
            });
        };

        if self.config.rename_columns {
            self.transformer.transform(&mut table, kind)?;
        }

        if columns.is_empty() {
            return Ok(table);
        }
        Ok(table.select(columns)?)
    }

    /// Renders the extracted codebook entries for `kind` as plain text,
    /// one `CODE` line followed by its indented description per variable.
    ///
    /// Returns an empty string when the codebook was never extracted.
    #[instrument(skip(self))]
    pub fn read_docs(&self, kind: DatafileType) -> Result<String, StatsError> {
        let Some(table) = self.repository.table_for(kind)? else {
            warn!(kind = %kind, "no codebook documentation has been extracted");
            return Ok(String::new());
        };

        let mut docs = String::new();
        for record in table.records() {
            docs.push_str(&record.variable_name);
            docs.push_str("\n  ");
            docs.push_str(&record.description);
            docs.push('\n');
        }
        Ok(docs)
    }
}
