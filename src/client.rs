//! The survey client facade.

use std::sync::Arc;

use tracing::instrument;

use crate::cache::OnDiskCache;
use crate::config::Config;
use crate::download::{BASE_URL, DatafileType, DownloadService};
use crate::error::PlsError;
use crate::pdf::ExtractionService;
use crate::scrape::{SURVEY_URL, ScrapingService};
use crate::stats::StatsService;
use crate::table::DataTable;
use crate::transform::TransformationService;
use crate::variables::{VariableRepository, Variables};

/// One year of the Public Libraries Survey: acquisition, extraction, and
/// the query surface, wired together.
///
/// Construction only prepares the on-disk layout; [`init`] performs the
/// network acquisition. The query methods work off whatever is
/// materialized, so a client over an already-populated data directory
/// never needs the network.
///
/// [`init`]: PublicLibrariesSurvey::init
pub struct PublicLibrariesSurvey {
    downloader: DownloadService<ScrapingService>,
    stats: StatsService,
    repository: Arc<VariableRepository>,
}

impl PublicLibrariesSurvey {
    /// Wires a client for `config` against the production survey site.
    pub fn new(config: Config) -> Result<Self, PlsError> {
        Self::with_urls(config, SURVEY_URL, BASE_URL)
    }

    /// Wires a client with explicit listing and base URLs (test servers).
    pub fn with_urls(
        config: Config,
        listing_url: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, PlsError> {
        // Downloaded artifacts are never destroyed implicitly; only the
        // derived cache honors the overwrite flag.
        let data_cache = Arc::new(OnDiskCache::new(&config.data_dir, &config, false)?);
        let derived_cache = Arc::new(OnDiskCache::new(
            &config.cache_dir,
            &config,
            config.overwrite_cache,
        )?);

        let scraper = ScrapingService::new(config.clone(), Arc::clone(&data_cache))
            .with_listing_url(listing_url);
        let downloader = DownloadService::new(config.clone(), scraper, Arc::clone(&data_cache))
            .with_base_url(base_url);

        let extraction = ExtractionService::new(Arc::clone(&data_cache), derived_cache);
        let repository = Arc::new(VariableRepository::new(extraction));
        let transformer = TransformationService::new(Arc::clone(&repository));
        let stats = StatsService::new(
            config,
            data_cache,
            transformer,
            Arc::clone(&repository),
        );

        Ok(Self {
            downloader,
            stats,
            repository,
        })
    }

    /// Acquires the year's artifacts: scrape, download, materialize.
    ///
    /// Idempotent; a fully-materialized year performs no network requests.
    #[instrument(skip(self))]
    pub async fn init(&self) -> Result<(), PlsError> {
        self.downloader.download().await?;
        Ok(())
    }

    /// The dataset for `kind`, renamed per configuration; `columns`
    /// projects the result when non-empty.
    pub fn get_stats(&self, kind: DatafileType, columns: &[&str]) -> Result<DataTable, PlsError> {
        Ok(self.stats.get_stats(kind, columns)?)
    }

    /// Plain-text codebook documentation for `kind`'s variables.
    pub fn read_docs(&self, kind: DatafileType) -> Result<String, PlsError> {
        Ok(self.stats.read_docs(kind)?)
    }

    /// The variable taxonomy for `kind`, when the codebook was extracted.
    pub fn variables_for(&self, kind: DatafileType) -> Result<Option<Variables>, PlsError> {
        Ok(self.repository.get_variables_for(kind)?)
    }

    /// A variable's codebook description, looked up by short code or long
    /// name.
    pub fn describe(&self, kind: DatafileType, name: &str) -> Result<Option<String>, PlsError> {
        Ok(self.repository.get_description(kind, name)?)
    }
}
