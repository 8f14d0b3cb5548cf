//! Row-level record type handed to job functions.

use indexmap::IndexMap;
use serde_json::Value;

/// One fully resolved row of a job table, keyed by column name in table order.
pub type JobRecord = IndexMap<String, Value>;

/// Renders a cell for matching and display.
///
/// Strings are returned verbatim; every other value uses its compact JSON
/// form, so `1` renders as `1` and `true` as `true`.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Renders a single column of a record, returning `None` when it is absent.
pub fn render_field(record: &JobRecord, column: &str) -> Option<String> {
    record.get(column).map(render_value)
}
