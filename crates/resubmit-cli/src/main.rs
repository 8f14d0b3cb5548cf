use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    check::{self, CheckArgs},
    grid::{self, GridArgs},
    submit::{self, SubmitArgs},
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

const DEFAULT_FILTER: &str = "resubmit=info";

#[derive(Parser, Debug)]
#[command(name = "resubmit", about = "Build parameter grids and submit them as jobs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expand a grid plan and print or export the job table.
    Grid(GridArgs),
    /// Check that key columns of a grid plan are unique.
    Check(CheckArgs),
    /// Run a shell command for every job of a plan.
    Submit(SubmitArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    // RUST_LOG overrides the default filter.
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Grid(args) => grid::run(&args),
        Command::Check(args) => check::run(&args),
        Command::Submit(args) => submit::run(&args),
    }
}
