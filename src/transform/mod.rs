//! Column renaming for loaded datasets.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::download::DatafileType;
use crate::pdf::ExtractionError;
use crate::table::DataTable;
use crate::variables::VariableRepository;

/// Renames a dataset's short-code columns to their taxonomy long names.
pub struct TransformationService {
    repository: Arc<VariableRepository>,
}

impl TransformationService {
    #[must_use]
    pub fn new(repository: Arc<VariableRepository>) -> Self {
        Self { repository }
    }

    /// Renames `table`'s columns in place using the taxonomy for `kind`.
    ///
    /// Columns without a mapping keep their original name. When the
    /// taxonomy is unavailable the table is left untouched.
    #[instrument(skip(self, table))]
    pub fn transform(
        &self,
        table: &mut DataTable,
        kind: DatafileType,
    ) -> Result<(), ExtractionError> {
        let Some(variables) = self.repository.get_variables_for(kind)? else {
            debug!(kind = %kind, "no variables available, columns keep their raw names");
            return Ok(());
        };

        let mapping = variables.flatten();

        let unmapped_columns: Vec<String> = table
            .columns()
            .iter()
            .filter(|column| !mapping.contains_key(*column))
            .cloned()
            .collect();
        let unused_mappings: Vec<String> = mapping
            .keys()
            .filter(|code| !table.columns().iter().any(|column| &column == code))
            .cloned()
            .collect();

        table.rename_columns(&mapping);

        if !unmapped_columns.is_empty() || !unused_mappings.is_empty() {
            warn!("Not all columns were successfully remapped. See debug logs for more details.");
            debug!(?unmapped_columns, "columns with no taxonomy entry");
            debug!(?unused_mappings, "taxonomy entries matching no column");
        }

        Ok(())
    }
}
