//! Capability traits for batch execution backends.
//!
//! A backend hands out an [`Executor`] bound to a log folder. The executor
//! accepts one parameter bundle and then a whole batch of records, returning
//! one [`JobHandle`] per record in submission order.

use std::collections::BTreeMap;
use std::sync::Arc;

use resubmit_core::errors::ResubError;
use resubmit_core::record::JobRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SubmitConfig;

/// User function applied to each job record.
pub type JobFn<R> = Arc<dyn Fn(&JobRecord) -> Result<R, ResubError> + Send + Sync>;

/// Wraps a closure as a [`JobFn`].
pub fn job_fn<R, F>(func: F) -> JobFn<R>
where
    F: Fn(&JobRecord) -> Result<R, ResubError> + Send + Sync + 'static,
{
    Arc::new(func)
}

const CONSTRAINT: &str = "constraint";
const RESERVATION: &str = "reservation";

/// Configuration bundle applied to an executor before submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorParameters {
    pub name: String,
    pub timeout_min: u64,
    pub cpus_per_task: u32,
    pub gpus_per_node: u32,
    pub mem_gb: u32,
    pub slurm_additional_parameters: BTreeMap<String, Value>,
}

impl ExecutorParameters {
    /// Builds the bundle for `config`.
    ///
    /// Explicit `constraint` / `reservation` settings replace entries of the
    /// same name in the additional parameters. When neither source provides
    /// them they are left out of the bundle entirely.
    pub fn from_config(config: &SubmitConfig) -> Self {
        let mut extra = config.slurm_additional_parameters.clone();
        for (key, explicit) in [
            (CONSTRAINT, &config.constraint),
            (RESERVATION, &config.reservation),
        ] {
            match explicit {
                Some(value) => {
                    extra.insert(key.to_string(), Value::String(value.clone()));
                }
                None => {
                    if matches!(extra.get(key), Some(Value::Null)) {
                        extra.remove(key);
                    }
                }
            }
        }
        Self {
            name: config.job_name.clone(),
            timeout_min: config.timeout_min,
            cpus_per_task: config.cpus_per_task,
            gpus_per_node: config.num_gpus,
            mem_gb: config.mem_gb,
            slurm_additional_parameters: extra,
        }
    }
}

impl Default for ExecutorParameters {
    fn default() -> Self {
        Self::from_config(&SubmitConfig::default())
    }
}

/// Reference to a submitted job.
pub trait JobHandle<R> {
    /// Identifier assigned by the executor.
    fn job_id(&self) -> &str;

    /// Blocks until the job finishes and returns its result.
    fn result(self) -> Result<R, ResubError>;
}

/// Batch executor bound to a log folder.
pub trait Executor<R> {
    type Handle: JobHandle<R>;

    /// Applies the configuration bundle for subsequent submissions.
    fn update_parameters(&mut self, params: ExecutorParameters) -> Result<(), ResubError>;

    /// Submits `func` once per record; handles come back in record order.
    fn map_array(
        &mut self,
        func: JobFn<R>,
        jobs: Vec<JobRecord>,
    ) -> Result<Vec<Self::Handle>, ResubError>;
}

/// Source of executors, consulted only when a submission goes remote.
pub trait ExecutorBackend<R> {
    type Executor: Executor<R>;

    /// Creates an executor writing its logs under `folder`.
    fn acquire(&self, folder: &str) -> Result<Self::Executor, ResubError>;
}
