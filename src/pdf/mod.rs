//! Variable extraction from the codebook PDF.
//!
//! The Documentation PDF carries three record-layout appendices, one per
//! canonical datafile kind. Extraction scans every page for the appendix
//! headings, parses candidate table rows from the matching pages, derives
//! long names, and caches each kind's table as soon as it is computed, so
//! a failure on a later kind never loses an earlier one.

mod error;
mod models;
mod tables;
mod text;

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::cache::OnDiskCache;
use crate::download::{DatafileType, DownloadResource};

pub use error::ExtractionError;
pub use models::{ExtractedVariables, VariableRecord, VariableTable};
pub use tables::derive_long_name;
pub use text::{LopdfTextSource, PdfTextSource};

/// Mines the codebook PDF for per-kind variable tables.
pub struct ExtractionService {
    data_cache: Arc<OnDiskCache>,
    derived_cache: Arc<OnDiskCache>,
    text_source: Box<dyn PdfTextSource>,
}

impl ExtractionService {
    /// Creates an extraction service reading the codebook from
    /// `data_cache` and persisting variable tables to `derived_cache`.
    #[must_use]
    pub fn new(data_cache: Arc<OnDiskCache>, derived_cache: Arc<OnDiskCache>) -> Self {
        Self::with_text_source(data_cache, derived_cache, LopdfTextSource)
    }

    /// Creates an extraction service with an explicit text source.
    #[must_use]
    pub fn with_text_source(
        data_cache: Arc<OnDiskCache>,
        derived_cache: Arc<OnDiskCache>,
        text_source: impl PdfTextSource + 'static,
    ) -> Self {
        Self {
            data_cache,
            derived_cache,
            text_source: Box::new(text_source),
        }
    }

    /// Extracts the per-kind variable tables.
    ///
    /// Returns the cached tables when all three kinds are already
    /// persisted. A missing Documentation PDF is a soft failure: `None` is
    /// returned and downstream consumers degrade to raw column names.
    #[instrument(skip(self))]
    pub fn extract(&self) -> Result<Option<ExtractedVariables>, ExtractionError> {
        if let Some(cached) = self.cached_tables()? {
            debug!("all variable tables cached, skipping PDF scan");
            return Ok(Some(cached));
        }

        let codebook = DownloadResource::Documentation.filename();
        if !self.data_cache.exists(codebook) {
            info!("no codebook PDF on disk, variables are unavailable");
            return Ok(None);
        }

        let codebook_path = self.data_cache.full_path(codebook);
        let page_texts = self.text_source.page_texts(&codebook_path)?;
        let pages_by_kind = tables::find_pages_with_tables(&page_texts);

        let mut extracted = ExtractedVariables::default();
        for kind in DatafileType::ALL {
            let mut rows = Vec::new();
            for &page_index in &pages_by_kind[&kind] {
                rows.extend(tables::parse_candidate_rows(&page_texts[page_index]));
            }

            let table = VariableTable::from_rows(rows);
            // Persist each kind as soon as it is computed; a later kind's
            // failure must not lose this one.
            self.derived_cache
                .put_table(&table.to_data_table(), kind.variables_cache_file())?;
            debug!(kind = %kind, records = table.len(), "extracted variable table");
            extracted.insert(kind, table);
        }

        Ok(Some(extracted))
    }

    /// Loads all three tables from the cache, or `None` when any is
    /// missing.
    fn cached_tables(&self) -> Result<Option<ExtractedVariables>, ExtractionError> {
        let mut extracted = ExtractedVariables::default();
        for kind in DatafileType::ALL {
            let resource = kind.variables_cache_file();
            let Some(table) = self.derived_cache.get_table(resource)? else {
                return Ok(None);
            };
            extracted.insert(kind, VariableTable::from_data_table(&table, resource)?);
        }
        Ok(Some(extracted))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tempfile::TempDir;

    use super::*;
    use crate::config::Config;

    struct StaticTextSource {
        pages: Vec<String>,
        calls: Arc<AtomicUsize>,
    }

    impl PdfTextSource for StaticTextSource {
        fn page_texts(&self, _path: &Path) -> Result<Vec<String>, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pages.clone())
        }
    }

    fn caches(dir: &TempDir) -> (Arc<OnDiskCache>, Arc<OnDiskCache>) {
        let config = Config::new(2018);
        let data = Arc::new(OnDiskCache::new(&dir.path().join("data"), &config, false).unwrap());
        let derived =
            Arc::new(OnDiskCache::new(&dir.path().join("cache"), &config, false).unwrap());
        (data, derived)
    }

    fn codebook_pages() -> Vec<String> {
        vec![
            "Survey overview, no tables here".to_string(),
            format!(
                "{}\nData Element   Type   Description\n\
                 STABR   AN   State abbreviation code\n\
                 POPU_LSA   N   Population of the legal service area",
                DatafileType::StateSummary.record_layout_heading()
            ),
            format!(
                "{} (continued)\nBKMOB   N   Number of bookmobiles.",
                DatafileType::StateSummary.record_layout_heading()
            ),
            format!(
                "{}\nLIBID   AN   Library identification code",
                DatafileType::SystemData.record_layout_heading()
            ),
            format!(
                "{}\nSQ_FEET   N   Square footage of the outlet",
                DatafileType::OutletData.record_layout_heading()
            ),
        ]
    }

    fn stub(pages: Vec<String>) -> (StaticTextSource, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            StaticTextSource {
                pages,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    #[test]
    fn test_extract_given_missing_codebook_returns_none() {
        let dir = TempDir::new().unwrap();
        let (data, derived) = caches(&dir);
        let (source, _calls) = stub(vec![]);
        let service = ExtractionService::with_text_source(data, derived, source);

        assert!(service.extract().unwrap().is_none());
    }

    #[test]
    fn test_extract_concatenates_pages_in_order_and_caches_each_kind() {
        let dir = TempDir::new().unwrap();
        let (data, derived) = caches(&dir);
        data.put_bytes(b"%PDF-", "Documentation.pdf").unwrap();

        let (source, _calls) = stub(codebook_pages());
        let service =
            ExtractionService::with_text_source(data, Arc::clone(&derived), source);

        let extracted = service.extract().unwrap().unwrap();

        let state = extracted.table(DatafileType::StateSummary).unwrap();
        let codes: Vec<&str> = state
            .records()
            .iter()
            .map(|r| r.variable_name.as_str())
            .collect();
        assert_eq!(codes, vec!["STABR", "POPU_LSA", "BKMOB"]);

        assert_eq!(extracted.table(DatafileType::SystemData).unwrap().len(), 1);
        assert_eq!(extracted.table(DatafileType::OutletData).unwrap().len(), 1);

        for kind in DatafileType::ALL {
            assert!(derived.exists(kind.variables_cache_file()), "{kind}");
        }
    }

    #[test]
    fn test_extract_prefers_cached_tables_over_pdf_scan() {
        let dir = TempDir::new().unwrap();
        let (data, derived) = caches(&dir);
        data.put_bytes(b"%PDF-", "Documentation.pdf").unwrap();

        let (source, _first_calls) = stub(codebook_pages());
        let first =
            ExtractionService::with_text_source(Arc::clone(&data), Arc::clone(&derived), source);
        first.extract().unwrap().unwrap();

        let (source, second_calls) = stub(codebook_pages());
        let second = ExtractionService::with_text_source(data, derived, source);
        let extracted = second.extract().unwrap().unwrap();

        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            extracted
                .table(DatafileType::StateSummary)
                .unwrap()
                .records()[2]
                .long_name,
            "Number_Of_Bookmobiles"
        );
    }
}
