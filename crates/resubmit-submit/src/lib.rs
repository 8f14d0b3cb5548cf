//! Job submission: local runs, debug-limited runs and batch executors.

mod command;
mod config;
mod debug;
mod dispatch;
mod executor;
mod plan;
mod pool;
mod prompt;

pub use command::{command_job, render_command, JOB_ENV};
pub use config::{PromptDirective, SubmitConfig};
pub use debug::{maybe_attach_debugger, DebuggerAttach, NoDebugger, TcpDebugListener};
pub use dispatch::{Dispatcher, HandleOf, Submission};
pub use executor::{job_fn, Executor, ExecutorBackend, ExecutorParameters, JobFn, JobHandle};
pub use plan::{load_submit_plan, submit_plan_from_yaml, SubmitPlan};
pub use pool::{PoolBackend, PoolExecutor, PoolHandle};
pub use prompt::{preview_lines, Confirm, StdinConfirm, StreamConfirm};
