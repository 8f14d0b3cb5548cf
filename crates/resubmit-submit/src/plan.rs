use std::fs;
use std::path::Path;

use resubmit_core::errors::{ErrorInfo, ResubError};
use resubmit_grid::serde::from_yaml_slice;
use resubmit_grid::GridPlan;
use serde::{Deserialize, Serialize};

use crate::config::SubmitConfig;

/// Grid plan plus the settings needed to submit it.
///
/// ```yaml
/// parameters:
///   seed: [0, 1]
/// unique_keys: [seed]
/// submit:
///   local_run: true
/// command: "echo {seed}"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitPlan {
    #[serde(flatten)]
    pub grid: GridPlan,
    #[serde(default)]
    pub submit: SubmitConfig,
    /// Shell template run for every job, see [`crate::command_job`].
    #[serde(default)]
    pub command: Option<String>,
}

/// Parses a submit plan from YAML text.
pub fn submit_plan_from_yaml(text: &str) -> Result<SubmitPlan, ResubError> {
    from_yaml_slice(text.as_bytes())
}

/// Loads a submit plan from disk.
pub fn load_submit_plan<P: AsRef<Path>>(path: P) -> Result<SubmitPlan, ResubError> {
    let bytes = fs::read(path.as_ref())
        .map_err(|err| ResubError::Serde(ErrorInfo::new("plan_read", err.to_string())))?;
    from_yaml_slice(&bytes)
}
