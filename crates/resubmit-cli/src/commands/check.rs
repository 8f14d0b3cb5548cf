use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use resubmit_core::render_value;
use resubmit_grid::{create_jobs_table, ensure_unique_combinations, load_grid_plan};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// YAML grid plan.
    #[arg(long)]
    pub plan: PathBuf,
    /// Comma separated key columns.
    #[arg(long, value_delimiter = ',', required = true)]
    pub keys: Vec<String>,
    /// List every duplicated combination instead of failing on the first.
    #[arg(long)]
    pub report: bool,
}

pub fn run(args: &CheckArgs) -> Result<(), Box<dyn Error>> {
    let plan = load_grid_plan(&args.plan)?;
    let table = create_jobs_table(&plan.to_param_spec())?;
    let (unique, report) = ensure_unique_combinations(&table, &args.keys, !args.report)?;
    if unique {
        println!("unique: {} rows", table.len());
        return Ok(());
    }
    if let Some(report) = report {
        println!(
            "duplicates: {} combination(s), {} surplus row(s)",
            report.groups.len(),
            report.surplus_rows()
        );
        for group in &report.groups {
            let values = report
                .keys
                .iter()
                .zip(&group.values)
                .map(|(key, value)| format!("{key}={}", render_value(value)))
                .collect::<Vec<_>>()
                .join(", ");
            let rows = group
                .rows
                .iter()
                .map(|row| row.to_string())
                .collect::<Vec<_>>()
                .join(",");
            println!("  ({values}) rows {rows}");
        }
    }
    Ok(())
}
