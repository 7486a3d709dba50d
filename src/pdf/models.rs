//! Extracted-variable records and per-kind tables.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::ExtractionError;
use super::tables::derive_long_name;
use crate::download::DatafileType;
use crate::table::DataTable;

/// One extracted variable definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRecord {
    /// The short code used as a column name in the datafiles.
    pub variable_name: String,
    /// The free-text description from the codebook.
    pub description: String,
    /// Canonical long name derived from the description.
    pub long_name: String,
}

/// Ordered collection of extracted variable records for one datafile kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    records: Vec<VariableRecord>,
}

impl VariableTable {
    /// Builds a table from `(variable_name, description)` rows, deriving
    /// each record's long name.
    #[must_use]
    pub fn from_rows(rows: Vec<(String, String)>) -> Self {
        let records = rows
            .into_iter()
            .map(|(variable_name, description)| {
                let long_name = derive_long_name(&description);
                VariableRecord {
                    variable_name,
                    description,
                    long_name,
                }
            })
            .collect();
        Self { records }
    }

    /// The records in extraction order.
    #[must_use]
    pub fn records(&self) -> &[VariableRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records were extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks a record up by short code or long name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&VariableRecord> {
        self.records
            .iter()
            .find(|r| r.variable_name == name || r.long_name == name)
    }

    /// Converts the table to the cached tabular form.
    #[must_use]
    pub fn to_data_table(&self) -> DataTable {
        let columns = vec![
            "variable_name".to_string(),
            "description".to_string(),
            "long_name".to_string(),
        ];
        let rows = self
            .records
            .iter()
            .map(|r| {
                vec![
                    r.variable_name.clone(),
                    r.description.clone(),
                    r.long_name.clone(),
                ]
            })
            .collect();
        DataTable::new(columns, rows)
    }

    /// Rebuilds a table from its cached tabular form.
    pub fn from_data_table(table: &DataTable, resource: &str) -> Result<Self, ExtractionError> {
        let column_index = |column: &'static str| {
            table
                .columns()
                .iter()
                .position(|c| c == column)
                .ok_or(ExtractionError::MalformedVariableTable {
                    resource: resource.to_string(),
                    column,
                })
        };

        let name_index = column_index("variable_name")?;
        let description_index = column_index("description")?;
        let long_name_index = column_index("long_name")?;

        let records = table
            .rows()
            .iter()
            .map(|row| VariableRecord {
                variable_name: row[name_index].clone(),
                description: row[description_index].clone(),
                long_name: row[long_name_index].clone(),
            })
            .collect();

        Ok(Self { records })
    }
}

/// The per-kind extraction result.
#[derive(Debug, Clone, Default)]
pub struct ExtractedVariables {
    tables: IndexMap<DatafileType, VariableTable>,
}

impl ExtractedVariables {
    pub(crate) fn insert(&mut self, kind: DatafileType, table: VariableTable) {
        self.tables.insert(kind, table);
    }

    /// The extracted table for `kind`, empty when nothing was extracted.
    #[must_use]
    pub fn table(&self, kind: DatafileType) -> Option<&VariableTable> {
        self.tables.get(&kind)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_derives_long_names() {
        let table = VariableTable::from_rows(vec![(
            "GPTERMS".to_string(),
            "Total number of computers (public access).".to_string(),
        )]);

        assert_eq!(table.records()[0].long_name, "Total_Number_Of_Computers");
    }

    #[test]
    fn test_data_table_round_trip() {
        let table = VariableTable::from_rows(vec![
            ("STABR".to_string(), "State code".to_string()),
            ("BKMOB".to_string(), "Number of bookmobiles.".to_string()),
        ]);

        let rebuilt =
            VariableTable::from_data_table(&table.to_data_table(), "state_summary.csv").unwrap();

        assert_eq!(table, rebuilt);
    }

    #[test]
    fn test_from_data_table_requires_expected_columns() {
        let table = DataTable::new(vec!["wrong".into()], vec![]);
        let err = VariableTable::from_data_table(&table, "outlet_data.csv").unwrap_err();
        assert!(err.to_string().contains("variable_name"));
    }

    #[test]
    fn test_find_matches_code_or_long_name() {
        let table = VariableTable::from_rows(vec![(
            "BKMOB".to_string(),
            "Number of bookmobiles.".to_string(),
        )]);

        assert!(table.find("BKMOB").is_some());
        assert!(table.find("Number_Of_Bookmobiles").is_some());
        assert!(table.find("nope").is_none());
    }
}
