use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use resubmit_submit::{
    command_job, load_submit_plan, Dispatcher, JobHandle, PoolBackend, PromptDirective,
    Submission,
};
use tracing::warn;

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// YAML submit plan.
    #[arg(long)]
    pub plan: PathBuf,
    /// Shell template run per job; overrides the plan's `command`.
    #[arg(long = "cmd")]
    pub command: Option<String>,
    /// Run jobs in this process one after another.
    #[arg(long)]
    pub local: bool,
    /// Wait for every job and print its output.
    #[arg(long)]
    pub block: bool,
    /// Run only the first job; a positive port also waits for a debugger.
    #[arg(long, allow_negative_numbers = true)]
    pub debug_port: Option<i64>,
    /// Skip the confirmation prompt.
    #[arg(long)]
    pub yes: bool,
    /// Worker threads for the job pool.
    #[arg(long)]
    pub workers: Option<usize>,
}

pub fn run(args: &SubmitArgs) -> Result<(), Box<dyn Error>> {
    let plan = load_submit_plan(&args.plan)?;
    let mut config = plan.submit.clone();
    config.local_run |= args.local;
    config.block |= args.block;
    if args.debug_port.is_some() {
        config.debug_port = args.debug_port;
    }
    if args.yes {
        config.prompt = PromptDirective::Flag(false);
    }
    let template = args
        .command
        .clone()
        .or_else(|| plan.command.clone())
        .ok_or("no command template: pass --cmd or set `command` in the plan")?;

    let backend = match args.workers {
        Some(workers) => PoolBackend::new().with_workers(workers),
        None => PoolBackend::new(),
    };
    let outcome = Dispatcher::new(backend).submit_jobs(
        &plan.grid.to_param_spec(),
        plan.grid.unique_keys.as_deref(),
        command_job(template),
        &config,
    )?;

    match outcome {
        Submission::NoJobs => println!("no jobs"),
        Submission::Aborted => println!("aborted"),
        Submission::Results(results) => {
            for line in results {
                println!("{line}");
            }
        }
        Submission::Handles(handles) => {
            for handle in &handles {
                println!("{}", handle.job_id());
            }
            // Pool workers live in this process; drain them before exiting.
            let mut first_error = None;
            for handle in handles {
                let job_id = handle.job_id().to_string();
                if let Err(err) = handle.result() {
                    warn!(%job_id, %err, "job failed");
                    first_error.get_or_insert(err);
                }
            }
            if let Some(err) = first_error {
                return Err(err.into());
            }
        }
    }
    Ok(())
}
