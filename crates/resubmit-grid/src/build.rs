use resubmit_core::errors::{ErrorInfo, ResubError};
use resubmit_core::record::render_value;
use serde_json::Value;

use crate::expand::{ExpandedSpec, ParamSpec, PatternRule};
use crate::table::JobTable;

/// Builds the job table for `spec`.
///
/// Stages run in a fixed order:
/// 1. cartesian product of the static lists (last declared key varies fastest),
/// 2. regex filters against their static column,
/// 3. computed columns, each seeing the static and earlier computed columns,
/// 4. transforms, each replacing the table produced by the previous one.
///
/// Failures inside computed columns and transforms are wrapped in
/// [`ResubError::Derivation`] carrying the entry name.
pub fn create_jobs_table(spec: &ParamSpec) -> Result<JobTable, ResubError> {
    let expanded = spec.expand()?;
    build_table(&expanded)
}

/// Runs the build stages over an already classified specification.
pub fn build_table(expanded: &ExpandedSpec) -> Result<JobTable, ResubError> {
    let mut table = cartesian_table(&expanded.statics)?;

    for (column, rule) in &expanded.filters {
        apply_filter(&mut table, expanded, column, rule)?;
    }

    for (name, func) in &expanded.computed {
        let values = func(&table).map_err(|err| ResubError::derivation(name, err))?;
        table
            .set_column(name, values)
            .map_err(|err| ResubError::derivation(name, err))?;
    }

    for (name, func) in &expanded.transforms {
        table = func(table).map_err(|err| ResubError::derivation(name, err))?;
    }

    Ok(table)
}

fn cartesian_table(statics: &[(String, Vec<Value>)]) -> Result<JobTable, ResubError> {
    if statics.is_empty() {
        return Ok(JobTable::empty());
    }
    let columns = statics.iter().map(|(name, _)| name.clone()).collect();
    let axes: Vec<&[Value]> = statics.iter().map(|(_, values)| values.as_slice()).collect();
    let mut rows = Vec::new();
    let mut current = Vec::with_capacity(axes.len());
    expand_grid(&axes, 0, &mut current, &mut rows);
    JobTable::new(columns, rows)
}

fn expand_grid(
    axes: &[&[Value]],
    idx: usize,
    current: &mut Vec<Value>,
    rows: &mut Vec<Vec<Value>>,
) {
    if idx == axes.len() {
        rows.push(current.clone());
        return;
    }
    for value in axes[idx] {
        current.push(value.clone());
        expand_grid(axes, idx + 1, current, rows);
        current.pop();
    }
}

fn apply_filter(
    table: &mut JobTable,
    expanded: &ExpandedSpec,
    column: &str,
    rule: &PatternRule,
) -> Result<(), ResubError> {
    let is_static = expanded.statics.iter().any(|(name, _)| name == column);
    let position = table.column_index(column).filter(|_| is_static);
    let Some(position) = position else {
        return Err(ResubError::Configuration(
            ErrorInfo::new(
                "filter-unknown-column",
                format!("regex filter targets '{column}', which is not a static column"),
            )
            .with_context("column", column)
            .with_context("pattern", rule.as_str()),
        ));
    };
    table.retain_rows(|row| rule.keeps(&render_value(&row[position])));
    Ok(())
}
