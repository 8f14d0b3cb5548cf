use std::collections::BTreeSet;

use resubmit_core::errors::{ErrorInfo, ResubError};
use resubmit_core::record::JobRecord;
use serde::Serialize;
use serde_json::Value;

fn table_error(code: &str, message: impl Into<String>) -> ResubError {
    ResubError::Configuration(ErrorInfo::new(code, message))
}

/// Rectangular table of job configurations.
///
/// Every row holds exactly one value per column. All constructors and
/// mutators enforce this, so a `JobTable` is always well formed.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct JobTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl JobTable {
    /// Table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table from column names and row-major values.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, ResubError> {
        ensure_distinct(&columns)?;
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ResubError::Configuration(
                    ErrorInfo::new("table-row-width", "row width does not match column count")
                        .with_context("row", idx.to_string())
                        .with_context("expected", columns.len().to_string())
                        .with_context("actual", row.len().to_string()),
                ));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Builds a table from named columns of equal length.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, ResubError>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let mut table = JobTable::empty();
        let mut first = true;
        for (name, values) in columns {
            if first {
                table.rows = vec![Vec::new(); values.len()];
                first = false;
            }
            let name = name.into();
            if table.has_column(&name) {
                return Err(table_error(
                    "table-duplicate-column",
                    format!("column '{name}' appears twice"),
                ));
            }
            table.set_column(&name, values)?;
        }
        Ok(table)
    }

    /// Builds a table from records, taking the column order of the first record.
    ///
    /// Every record must carry the same set of columns.
    pub fn from_records(records: &[JobRecord]) -> Result<Self, ResubError> {
        let Some(first) = records.first() else {
            return Ok(JobTable::empty());
        };
        let columns: Vec<String> = first.keys().cloned().collect();
        let mut rows = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if record.len() != columns.len() {
                return Err(mismatched_record(idx));
            }
            let mut row = Vec::with_capacity(columns.len());
            for column in &columns {
                match record.get(column) {
                    Some(value) => row.push(value.clone()),
                    None => return Err(mismatched_record(idx)),
                }
            }
            rows.push(row);
        }
        Ok(Self { columns, rows })
    }

    /// Column names in table order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row-major cell values.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` among the columns.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns true when `name` is a column of the table.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Borrowed values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Owned values of one column; a missing column is a configuration error.
    pub fn column_values(&self, name: &str) -> Result<Vec<Value>, ResubError> {
        self.column(name)
            .map(|values| values.into_iter().cloned().collect())
            .ok_or_else(|| unknown_column(name))
    }

    /// Cell at `row` in column `name`.
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|cells| &cells[idx])
    }

    /// Converts one row into a record.
    pub fn record(&self, row: usize) -> Option<JobRecord> {
        self.rows.get(row).map(|cells| {
            self.columns
                .iter()
                .cloned()
                .zip(cells.iter().cloned())
                .collect()
        })
    }

    /// Converts every row into a record, preserving row order.
    pub fn records(&self) -> Vec<JobRecord> {
        (0..self.rows.len())
            .filter_map(|row| self.record(row))
            .collect()
    }

    /// Adds a column, or replaces an existing one in place.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), ResubError> {
        if values.len() != self.rows.len() {
            return Err(ResubError::Configuration(
                ErrorInfo::new("column-length", "column length does not match row count")
                    .with_context("column", name)
                    .with_context("expected", self.rows.len().to_string())
                    .with_context("actual", values.len().to_string()),
            ));
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Keeps only the rows for which `keep` returns true.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }
}

pub(crate) fn unknown_column(name: &str) -> ResubError {
    ResubError::Configuration(
        ErrorInfo::new("unknown-column", format!("column '{name}' does not exist"))
            .with_context("column", name),
    )
}

fn mismatched_record(idx: usize) -> ResubError {
    ResubError::Configuration(
        ErrorInfo::new("record-columns", "record columns differ from the first record")
            .with_context("row", idx.to_string()),
    )
}

fn ensure_distinct(columns: &[String]) -> Result<(), ResubError> {
    let mut seen = BTreeSet::new();
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(table_error(
                "table-duplicate-column",
                format!("column '{column}' appears twice"),
            ));
        }
    }
    Ok(())
}
