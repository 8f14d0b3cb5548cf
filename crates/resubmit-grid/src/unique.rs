use indexmap::IndexMap;
use resubmit_core::errors::{ErrorInfo, ResubError};
use resubmit_core::record::render_value;
use serde::Serialize;
use serde_json::Value;

use crate::serde::to_canonical_json_bytes;
use crate::table::{unknown_column, JobTable};

/// One key combination shared by several rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    /// Values of the key columns, in key order.
    pub values: Vec<Value>,
    /// Indices of the rows sharing these values.
    pub rows: Vec<usize>,
}

/// Every duplicated key combination of a table, in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateReport {
    pub keys: Vec<String>,
    pub groups: Vec<DuplicateGroup>,
}

impl DuplicateReport {
    /// Number of rows that repeat an earlier key combination.
    pub fn surplus_rows(&self) -> usize {
        self.groups.iter().map(|group| group.rows.len() - 1).sum()
    }

    fn describe(&self, group: &DuplicateGroup) -> String {
        self.keys
            .iter()
            .zip(&group.values)
            .map(|(key, value)| format!("{key}={}", render_value(value)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Checks that no two rows share the same values in `keys`.
///
/// Returns `(true, None)` when every combination is unique. On duplicates,
/// either fails with [`ResubError::Uniqueness`] naming the first duplicated
/// combination (`raise_on_conflict`), or returns `(false, Some(report))`.
pub fn ensure_unique_combinations<S: AsRef<str>>(
    table: &JobTable,
    keys: &[S],
    raise_on_conflict: bool,
) -> Result<(bool, Option<DuplicateReport>), ResubError> {
    if keys.is_empty() {
        return Err(ResubError::Configuration(ErrorInfo::new(
            "unique-no-keys",
            "at least one key column is required",
        )));
    }
    let indices = keys
        .iter()
        .map(|key| {
            table
                .column_index(key.as_ref())
                .ok_or_else(|| unknown_column(key.as_ref()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen: IndexMap<Vec<u8>, DuplicateGroup> = IndexMap::new();
    for (row_idx, row) in table.rows().iter().enumerate() {
        let values: Vec<Value> = indices.iter().map(|&idx| row[idx].clone()).collect();
        let fingerprint = to_canonical_json_bytes(&values)?;
        seen.entry(fingerprint)
            .or_insert_with(|| DuplicateGroup {
                values,
                rows: Vec::new(),
            })
            .rows
            .push(row_idx);
    }

    let groups: Vec<DuplicateGroup> = seen
        .into_values()
        .filter(|group| group.rows.len() > 1)
        .collect();
    if groups.is_empty() {
        return Ok((true, None));
    }

    let report = DuplicateReport {
        keys: keys.iter().map(|key| key.as_ref().to_string()).collect(),
        groups,
    };
    if raise_on_conflict {
        let first = &report.groups[0];
        let rows = first
            .rows
            .iter()
            .map(|row| row.to_string())
            .collect::<Vec<_>>()
            .join(",");
        return Err(ResubError::Uniqueness(
            ErrorInfo::new(
                "duplicate-combination",
                format!("duplicate combination ({})", report.describe(first)),
            )
            .with_context("rows", rows)
            .with_context("groups", report.groups.len().to_string())
            .with_hint("add a distinguishing column or drop the duplicated parameters"),
        ));
    }
    Ok((false, Some(report)))
}
