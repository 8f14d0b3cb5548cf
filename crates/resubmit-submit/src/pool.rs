//! In-process batch backend running jobs on a rayon thread pool.
//!
//! Each job gets its own folder (the configured folder with `%j` replaced by
//! the job id) holding `params.json` and, once finished, `STATUS`. Job ids
//! are `<name>_<dispatch timestamp>_<sequence>`, the sequence being unique
//! within the process, so repeated submissions to one folder never share a
//! job folder.

use std::fs;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use resubmit_core::errors::{ErrorInfo, ResubError};
use resubmit_core::record::JobRecord;
use resubmit_grid::to_canonical_json_bytes;
use tracing::{debug, info, warn};

use crate::executor::{Executor, ExecutorBackend, ExecutorParameters, JobFn, JobHandle};

const JOB_ID_PLACEHOLDER: &str = "%j";

static NEXT_JOB: AtomicU64 = AtomicU64::new(0);

fn remote_error(code: &str, err: impl ToString) -> ResubError {
    ResubError::Remote(ErrorInfo::new(code, err.to_string()))
}

/// Backend handing out [`PoolExecutor`]s.
#[derive(Debug, Clone, Default)]
pub struct PoolBackend {
    workers: Option<usize>,
}

impl PoolBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the number of worker threads; defaults to `cpus_per_task`.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }
}

impl<R: Send + 'static> ExecutorBackend<R> for PoolBackend {
    type Executor = PoolExecutor;

    fn acquire(&self, folder: &str) -> Result<PoolExecutor, ResubError> {
        if folder.trim().is_empty() {
            return Err(ResubError::Configuration(ErrorInfo::new(
                "empty-folder",
                "executor folder must not be empty",
            )));
        }
        Ok(PoolExecutor {
            folder: folder.to_string(),
            workers: self.workers,
            params: ExecutorParameters::default(),
        })
    }
}

/// Executor bound to one log folder.
#[derive(Debug, Clone)]
pub struct PoolExecutor {
    folder: String,
    workers: Option<usize>,
    params: ExecutorParameters,
}

impl PoolExecutor {
    fn job_dir(&self, job_id: &str) -> PathBuf {
        if self.folder.contains(JOB_ID_PLACEHOLDER) {
            PathBuf::from(self.folder.replace(JOB_ID_PLACEHOLDER, job_id))
        } else {
            Path::new(&self.folder).join(job_id)
        }
    }
}

impl<R: Send + 'static> Executor<R> for PoolExecutor {
    type Handle = PoolHandle<R>;

    fn update_parameters(&mut self, params: ExecutorParameters) -> Result<(), ResubError> {
        if params.name.is_empty() {
            return Err(ResubError::Configuration(ErrorInfo::new(
                "empty-job-name",
                "job name must not be empty",
            )));
        }
        self.params = params;
        Ok(())
    }

    fn map_array(
        &mut self,
        func: JobFn<R>,
        jobs: Vec<JobRecord>,
    ) -> Result<Vec<PoolHandle<R>>, ResubError> {
        let threads = self
            .workers
            .unwrap_or(self.params.cpus_per_task as usize)
            .max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("resubmit-worker-{idx}"))
            .build()
            .map_err(|err| remote_error("thread_pool", err))?;
        // The limit runs from dispatch; an overrunning job is abandoned, not stopped.
        let deadline = match self.params.timeout_min {
            0 => None,
            minutes => {
                Instant::now().checked_add(Duration::from_secs(minutes.saturating_mul(60)))
            }
        };
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%6f");

        let mut handles = Vec::with_capacity(jobs.len());
        for record in jobs {
            let sequence = NEXT_JOB.fetch_add(1, Ordering::Relaxed);
            let job_id = format!("{}_{stamp}_{sequence}", self.params.name);
            let dir = self.job_dir(&job_id);
            fs::create_dir_all(&dir).map_err(|err| remote_error("job_dir", err))?;
            let params = to_canonical_json_bytes(&record)?;
            fs::write(dir.join("params.json"), params)
                .map_err(|err| remote_error("job_params_write", err))?;

            let (tx, rx) = mpsc::channel();
            let func = Arc::clone(&func);
            let id = job_id.clone();
            pool.spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| func(&record)))
                    .unwrap_or_else(|_| Err(ResubError::job(format!("job {id} panicked"))));
                write_status(&dir, &outcome);
                let _ = tx.send(outcome);
            });
            debug!(job_id = %job_id, "queued job");
            handles.push(PoolHandle {
                job_id,
                receiver: rx,
                deadline,
                _result: PhantomData,
            });
        }
        info!(jobs = handles.len(), threads, "dispatched job array");
        Ok(handles)
    }
}

fn write_status<R>(dir: &Path, outcome: &Result<R, ResubError>) {
    let finished_at = chrono::Utc::now().to_rfc3339();
    let status = match outcome {
        Ok(_) => format!("completed\nfinished_at={finished_at}\n"),
        Err(err) => format!("failed\nfinished_at={finished_at}\nerror={err}\n"),
    };
    if let Err(err) = fs::write(dir.join("STATUS"), status) {
        warn!(dir = %dir.display(), %err, "could not record job status");
    }
}

/// Handle to a job running on a [`PoolExecutor`].
#[derive(Debug)]
pub struct PoolHandle<R> {
    job_id: String,
    receiver: Receiver<Result<R, ResubError>>,
    deadline: Option<Instant>,
    _result: PhantomData<fn() -> R>,
}

impl<R> JobHandle<R> for PoolHandle<R> {
    fn job_id(&self) -> &str {
        &self.job_id
    }

    fn result(self) -> Result<R, ResubError> {
        let received = match self.deadline {
            Some(deadline) => self
                .receiver
                .recv_timeout(deadline.saturating_duration_since(Instant::now())),
            None => self
                .receiver
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => Err(ResubError::Remote(
                ErrorInfo::new("job-timeout", "job exceeded its time limit")
                    .with_context("job_id", self.job_id),
            )),
            Err(RecvTimeoutError::Disconnected) => Err(ResubError::Remote(
                ErrorInfo::new("job-lost", "worker stopped without reporting a result")
                    .with_context("job_id", self.job_id),
            )),
        }
    }
}
