//! Lookup layer over the extracted variable tables.

use tracing::debug;

use super::Variables;
use crate::download::DatafileType;
use crate::pdf::{ExtractionError, ExtractionService, VariableTable};

/// Serves per-kind variable taxonomies built from the extracted codebook
/// tables.
pub struct VariableRepository {
    extraction: ExtractionService,
}

impl VariableRepository {
    #[must_use]
    pub fn new(extraction: ExtractionService) -> Self {
        Self { extraction }
    }

    /// The variable taxonomy for `kind`, or `None` when the codebook was
    /// never extracted.
    ///
    /// Records with no derivable long name are kept unrenamed rather than
    /// dropped, so every extracted code stays addressable.
    pub fn get_variables_for(
        &self,
        kind: DatafileType,
    ) -> Result<Option<Variables>, ExtractionError> {
        let Some(extracted) = self.extraction.extract()? else {
            debug!(kind = %kind, "no extracted variables available");
            return Ok(None);
        };

        let Some(table) = extracted.table(kind) else {
            return Ok(None);
        };

        let records = table
            .records()
            .iter()
            .map(|r| (r.variable_name.clone(), r.long_name.clone()))
            .collect::<Vec<_>>();

        Ok(Some(Variables::from_records(records)))
    }

    /// The raw extracted table for `kind`, with descriptions.
    pub fn table_for(&self, kind: DatafileType) -> Result<Option<VariableTable>, ExtractionError> {
        let Some(extracted) = self.extraction.extract()? else {
            return Ok(None);
        };
        Ok(extracted.table(kind).cloned())
    }

    /// Looks up a variable's codebook description by short code or long
    /// name.
    pub fn get_description(
        &self,
        kind: DatafileType,
        name: &str,
    ) -> Result<Option<String>, ExtractionError> {
        let Some(table) = self.table_for(kind)? else {
            return Ok(None);
        };
        Ok(table.find(name).map(|r| r.description.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::cache::OnDiskCache;
    use crate::config::Config;
    use crate::pdf::PdfTextSource;

    struct StaticTextSource(Vec<String>);

    impl PdfTextSource for StaticTextSource {
        fn page_texts(&self, _path: &Path) -> Result<Vec<String>, ExtractionError> {
            Ok(self.0.clone())
        }
    }

    fn repository(dir: &TempDir, pages: Vec<String>, with_codebook: bool) -> VariableRepository {
        let config = Config::new(2018);
        let data = Arc::new(OnDiskCache::new(&dir.path().join("data"), &config, false).unwrap());
        let derived =
            Arc::new(OnDiskCache::new(&dir.path().join("cache"), &config, false).unwrap());
        if with_codebook {
            data.put_bytes(b"%PDF-", "Documentation.pdf").unwrap();
        }
        VariableRepository::new(ExtractionService::with_text_source(
            data,
            derived,
            StaticTextSource(pages),
        ))
    }

    fn codebook_pages() -> Vec<String> {
        vec![format!(
            "{}\nSTABR   AN   State abbreviation code\n\
             BKMOB   N   Number of bookmobiles.",
            DatafileType::StateSummary.record_layout_heading()
        )]
    }

    #[test]
    fn test_get_variables_given_no_codebook_returns_none() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir, vec![], false);

        assert!(
            repo.get_variables_for(DatafileType::StateSummary)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_get_variables_builds_flat_taxonomy() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir, codebook_pages(), true);

        let vars = repo
            .get_variables_for(DatafileType::StateSummary)
            .unwrap()
            .unwrap();

        assert_eq!(vars.leaf("STABR").unwrap(), "State_Abbreviation_Code");
        assert_eq!(vars.leaf("BKMOB").unwrap(), "Number_Of_Bookmobiles");
    }

    #[test]
    fn test_get_description_by_code_or_long_name() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir, codebook_pages(), true);

        let by_code = repo
            .get_description(DatafileType::StateSummary, "BKMOB")
            .unwrap()
            .unwrap();
        let by_long_name = repo
            .get_description(DatafileType::StateSummary, "Number_Of_Bookmobiles")
            .unwrap()
            .unwrap();

        assert_eq!(by_code, "Number of bookmobiles.");
        assert_eq!(by_code, by_long_name);
        assert!(
            repo.get_description(DatafileType::StateSummary, "missing")
                .unwrap()
                .is_none()
        );
    }
}
