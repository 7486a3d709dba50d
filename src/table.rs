//! A minimal owned tabular dataset.
//!
//! The pipeline only ever renames and projects columns, so a plain
//! columns-and-rows structure with CSV I/O is all that is needed.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;

/// Errors produced by tabular operations.
#[derive(Debug, Error)]
pub enum TableError {
    /// CSV parse or I/O failure while reading or writing a table.
    #[error("CSV error for {path}: {source}")]
    Csv {
        /// File the operation was reading or writing.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// A requested column is not present in the table.
    #[error("unknown column: {name}")]
    UnknownColumn {
        /// The missing column name.
        name: String,
    },
}

/// An in-memory table: ordered column names plus string-valued rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Creates a table from parts. Rows shorter than the header are padded
    /// with empty cells so projection stays in bounds.
    #[must_use]
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<String>>) -> Self {
        for row in &mut rows {
            row.resize(columns.len(), String::new());
        }
        Self { columns, rows }
    }

    /// Reads a table from a CSV file with a header row.
    pub fn read_csv(path: &Path) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_path(path).map_err(|source| TableError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let columns = reader
            .headers()
            .map_err(|source| TableError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .iter()
            .map(ToOwned::to_owned)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| TableError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            rows.push(record.iter().map(ToOwned::to_owned).collect());
        }

        Ok(Self::new(columns, rows))
    }

    /// Writes the table to a CSV file with a header row.
    pub fn write_csv(&self, path: &Path) -> Result<(), TableError> {
        let mut writer = csv::Writer::from_path(path).map_err(|source| TableError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let wrap = |source| TableError::Csv {
            path: path.to_path_buf(),
            source,
        };

        writer.write_record(&self.columns).map_err(wrap)?;
        for row in &self.rows {
            writer.write_record(row).map_err(wrap)?;
        }
        writer.flush().map_err(|source| TableError::Csv {
            path: path.to_path_buf(),
            source: source.into(),
        })?;

        Ok(())
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renames columns in place using `mapping`; columns without an entry
    /// pass through unchanged.
    pub fn rename_columns(&mut self, mapping: &IndexMap<String, String>) {
        for column in &mut self.columns {
            if let Some(renamed) = mapping.get(column.as_str()) {
                *column = renamed.clone();
            }
        }
    }

    /// Returns a new table containing only the requested columns, in the
    /// requested order.
    pub fn select(&self, columns: &[&str]) -> Result<Self, TableError> {
        let mut indices = Vec::with_capacity(columns.len());
        for name in columns {
            let index = self
                .columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| TableError::UnknownColumn {
                    name: (*name).to_string(),
                })?;
            indices.push(index);
        }

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows,
        })
    }
}

impl fmt::Display for DataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.columns.join(","))?;
        for row in &self.rows {
            writeln!(f, "{}", row.join(","))?;
        }
        Ok(())
    }
}
