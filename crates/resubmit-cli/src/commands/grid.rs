use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use resubmit_grid::{
    create_jobs_table, ensure_unique_combinations, load_grid_plan, table_fingerprint,
    write_table_csv, write_table_json, JobTable,
};

#[derive(Args, Debug)]
pub struct GridArgs {
    /// YAML grid plan.
    #[arg(long)]
    pub plan: PathBuf,
    /// Export the table; `.csv` writes CSV, anything else canonical JSON.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &GridArgs) -> Result<(), Box<dyn Error>> {
    let plan = load_grid_plan(&args.plan)?;
    let table = create_jobs_table(&plan.to_param_spec())?;
    if let Some(keys) = &plan.unique_keys {
        ensure_unique_combinations(&table, keys, true)?;
    }
    println!("rows: {}", table.len());
    println!("columns: {}", table.columns().join(", "));
    println!("fingerprint: {}", table_fingerprint(&table)?);
    if let Some(out) = &args.out {
        export(out, &table)?;
        println!("wrote {}", out.display());
    }
    Ok(())
}

fn export(out: &Path, table: &JobTable) -> Result<(), Box<dyn Error>> {
    match out.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => write_table_csv(out, table)?,
        _ => write_table_json(out, table)?,
    }
    Ok(())
}
