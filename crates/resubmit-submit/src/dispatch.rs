use std::sync::Arc;

use resubmit_core::errors::ResubError;
use resubmit_core::record::JobRecord;
use resubmit_grid::{create_jobs_table, ensure_unique_combinations, ParamSpec};
use tracing::{debug, info};

use crate::config::SubmitConfig;
use crate::debug::{maybe_attach_debugger, DebuggerAttach, TcpDebugListener};
use crate::executor::{Executor, ExecutorBackend, ExecutorParameters, JobFn, JobHandle};
use crate::prompt::{preview_lines, Confirm, StdinConfirm};

/// Handle type produced by backend `B` for results of type `R`.
pub type HandleOf<B, R> = <<B as ExecutorBackend<R>>::Executor as Executor<R>>::Handle;

/// Outcome of a submission.
#[derive(Debug)]
pub enum Submission<R, H> {
    /// The table was empty; nothing ran and no executor was created.
    NoJobs,
    /// The operator declined the confirmation prompt.
    Aborted,
    /// Results in record order, from a local run or a blocking remote run.
    Results(Vec<R>),
    /// Handles of non-blocking remote jobs in record order.
    Handles(Vec<H>),
}

impl<R, H> Submission<R, H> {
    pub fn results(self) -> Option<Vec<R>> {
        match self {
            Submission::Results(results) => Some(results),
            _ => None,
        }
    }

    pub fn handles(self) -> Option<Vec<H>> {
        match self {
            Submission::Handles(handles) => Some(handles),
            _ => None,
        }
    }

    pub fn is_no_jobs(&self) -> bool {
        matches!(self, Submission::NoJobs)
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Submission::Aborted)
    }
}

/// Routes job records to local execution or an executor backend.
pub struct Dispatcher<B> {
    backend: B,
    debugger: Arc<dyn DebuggerAttach>,
    confirm: Box<dyn Confirm>,
}

impl<B> Dispatcher<B> {
    /// Dispatcher asking on stdin and listening for debuggers on all interfaces.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            debugger: Arc::new(TcpDebugListener::default()),
            confirm: Box::new(StdinConfirm),
        }
    }

    pub fn with_debugger(mut self, debugger: Arc<dyn DebuggerAttach>) -> Self {
        self.debugger = debugger;
        self
    }

    pub fn with_confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    /// Builds the job table for `spec`, checks `unique_keys` when given and
    /// submits every row.
    pub fn submit_jobs<R>(
        &mut self,
        spec: &ParamSpec,
        unique_keys: Option<&[String]>,
        func: JobFn<R>,
        config: &SubmitConfig,
    ) -> Result<Submission<R, HandleOf<B, R>>, ResubError>
    where
        B: ExecutorBackend<R>,
        R: 'static,
    {
        let table = create_jobs_table(spec)?;
        if let Some(keys) = unique_keys {
            ensure_unique_combinations(&table, keys, true)?;
        }
        self.submit_records(table.records(), func, config)
    }

    /// Submits already materialised job records.
    ///
    /// Order of decisions: empty input returns [`Submission::NoJobs`]; a
    /// non-negative debug port keeps only the first record (and a positive one
    /// waits for a debugger before the job body runs); an active prompt may
    /// abort; `local_run` runs in this thread; anything else goes through the
    /// backend.
    pub fn submit_records<R>(
        &mut self,
        records: Vec<JobRecord>,
        func: JobFn<R>,
        config: &SubmitConfig,
    ) -> Result<Submission<R, HandleOf<B, R>>, ResubError>
    where
        B: ExecutorBackend<R>,
        R: 'static,
    {
        if records.is_empty() {
            info!("No jobs to run exiting");
            return Ok(Submission::NoJobs);
        }

        let (records, func) = match config.debug_port {
            Some(port) if port >= 0 => {
                info!(port, "Debug mode: running only the first job");
                let first = records.into_iter().take(1).collect();
                let func = if port > 0 {
                    attach_before(func, Arc::clone(&self.debugger), port)
                } else {
                    func
                };
                (first, func)
            }
            _ => (records, func),
        };

        if config.prompt.is_active() {
            let preview = preview_lines(&records, &config.prompt);
            if !self.confirm.confirm(&preview)? {
                info!("Aborted");
                return Ok(Submission::Aborted);
            }
        }

        if config.local_run {
            info!(jobs = records.len(), "Running the jobs locally");
            let results = records
                .iter()
                .map(|record| func(record))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Submission::Results(results));
        }

        self.submit_remote(records, func, config)
    }

    fn submit_remote<R>(
        &self,
        records: Vec<JobRecord>,
        func: JobFn<R>,
        config: &SubmitConfig,
    ) -> Result<Submission<R, HandleOf<B, R>>, ResubError>
    where
        B: ExecutorBackend<R>,
        R: 'static,
    {
        info!(folder = %config.folder, jobs = records.len(), "submitting jobs");
        let mut executor = self.backend.acquire(&config.folder)?;
        let params = ExecutorParameters::from_config(config);
        debug!(?params, "executor parameters");
        executor.update_parameters(params)?;
        let handles = executor.map_array(func, records)?;
        info!(jobs = handles.len(), "Job submitted");

        if !config.block {
            return Ok(Submission::Handles(handles));
        }
        info!("Waiting for job to finish");
        let results = handles
            .into_iter()
            .map(<HandleOf<B, R> as JobHandle<R>>::result)
            .collect::<Result<Vec<_>, _>>()?;
        info!("All jobs finished");
        Ok(Submission::Results(results))
    }
}

fn attach_before<R: 'static>(
    func: JobFn<R>,
    debugger: Arc<dyn DebuggerAttach>,
    port: i64,
) -> JobFn<R> {
    Arc::new(move |record| {
        maybe_attach_debugger(debugger.as_ref(), Some(port))?;
        func(record)
    })
}
