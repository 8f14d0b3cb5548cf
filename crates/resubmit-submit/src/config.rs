use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Confirmation behaviour before submitting.
///
/// `false` skips the prompt, `true` asks once, and a column name also lists
/// that column's value for every job before asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptDirective {
    Flag(bool),
    Column(String),
}

impl PromptDirective {
    /// Returns true when a confirmation is required.
    pub fn is_active(&self) -> bool {
        !matches!(self, PromptDirective::Flag(false))
    }

    /// Column to preview, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            PromptDirective::Column(name) => Some(name),
            PromptDirective::Flag(_) => None,
        }
    }
}

impl Default for PromptDirective {
    fn default() -> Self {
        PromptDirective::Flag(true)
    }
}

impl From<bool> for PromptDirective {
    fn from(flag: bool) -> Self {
        PromptDirective::Flag(flag)
    }
}

/// YAML-configurable settings for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitConfig {
    /// Per-job wall clock limit in minutes; 0 means unbounded.
    #[serde(default = "default_timeout_min")]
    pub timeout_min: u64,
    /// CPUs requested per job.
    #[serde(default = "default_cpus_per_task")]
    pub cpus_per_task: u32,
    /// Memory requested per job, in gigabytes.
    #[serde(default = "default_mem_gb")]
    pub mem_gb: u32,
    /// GPUs requested per job.
    #[serde(default)]
    pub num_gpus: u32,
    /// Log folder handed to the executor; `%j` expands to the job id.
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Job name reported to the executor.
    #[serde(default = "default_job_name")]
    pub job_name: String,
    /// Wait for every remote job and return its result.
    #[serde(default)]
    pub block: bool,
    /// Confirmation prompt before dispatch.
    #[serde(default)]
    pub prompt: PromptDirective,
    /// Run jobs in the calling thread instead of submitting them.
    #[serde(default)]
    pub local_run: bool,
    /// Debug directive: non-negative limits the run to the first job; positive
    /// additionally waits for a debugger on that port before the job starts.
    #[serde(default)]
    pub debug_port: Option<i64>,
    /// Scheduler-specific settings forwarded verbatim.
    #[serde(default)]
    pub slurm_additional_parameters: BTreeMap<String, Value>,
    /// Node constraint; overrides the same key in the additional parameters.
    #[serde(default)]
    pub constraint: Option<String>,
    /// Reservation name; overrides the same key in the additional parameters.
    #[serde(default)]
    pub reservation: Option<String>,
}

fn default_timeout_min() -> u64 {
    60
}

fn default_cpus_per_task() -> u32 {
    1
}

fn default_mem_gb() -> u32 {
    8
}

fn default_folder() -> String {
    "logs/%j".to_string()
}

fn default_job_name() -> String {
    "resubmit".to_string()
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            timeout_min: default_timeout_min(),
            cpus_per_task: default_cpus_per_task(),
            mem_gb: default_mem_gb(),
            num_gpus: 0,
            folder: default_folder(),
            job_name: default_job_name(),
            block: false,
            prompt: PromptDirective::default(),
            local_run: false,
            debug_port: None,
            slurm_additional_parameters: BTreeMap::new(),
            constraint: None,
            reservation: None,
        }
    }
}
