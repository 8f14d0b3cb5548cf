use std::fs;
use std::path::Path;

use csv::WriterBuilder;
use resubmit_core::errors::{ErrorInfo, ResubError};
use resubmit_core::record::render_value;

use crate::serde::to_canonical_json_bytes;
use crate::table::JobTable;

fn wrap_csv(code: &str, err: csv::Error) -> ResubError {
    ResubError::Serde(ErrorInfo::new(code, "CSV export failure").with_hint(err.to_string()))
}

fn ensure_parent(path: &Path) -> Result<(), ResubError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            ResubError::Serde(
                ErrorInfo::new("export-create", "failed to create export directory")
                    .with_context("path", parent.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
    }
    Ok(())
}

/// Writes the table as CSV with a header row; cells use their rendered form.
pub fn write_table_csv(path: &Path, table: &JobTable) -> Result<(), ResubError> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|err| wrap_csv("export-open", err))?;
    writer
        .write_record(table.columns())
        .map_err(|err| wrap_csv("export-header", err))?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(render_value))
            .map_err(|err| wrap_csv("export-row", err))?;
    }
    writer
        .flush()
        .map_err(|err| wrap_csv("export-flush", err.into()))
}

/// Writes the table as a canonical JSON array of records.
pub fn write_table_json(path: &Path, table: &JobTable) -> Result<(), ResubError> {
    ensure_parent(path)?;
    let bytes = to_canonical_json_bytes(&table.records())?;
    fs::write(path, bytes).map_err(|err| {
        ResubError::Serde(
            ErrorInfo::new("export-write", "failed to write JSON export")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })
}
