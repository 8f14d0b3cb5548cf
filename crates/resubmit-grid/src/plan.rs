use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use resubmit_core::errors::{ErrorInfo, ResubError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::expand::{ParamSpec, RawEntry};
use crate::hash::stable_hash_string;
use crate::serde::from_yaml_slice;

fn io_error(code: &str, err: impl ToString) -> ResubError {
    ResubError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// File-backed grid description.
///
/// `parameters` follows the same key convention as [`ParamSpec`], restricted
/// to what YAML can express: static lists and regex pattern strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPlan {
    /// Specification entries in document order.
    pub parameters: IndexMap<String, Value>,
    /// Columns whose combinations must be unique across the table.
    #[serde(default)]
    pub unique_keys: Option<Vec<String>>,
}

impl GridPlan {
    /// Converts the plan into a parameter specification.
    pub fn to_param_spec(&self) -> ParamSpec {
        self.parameters
            .iter()
            .fold(ParamSpec::new(), |spec, (key, value)| {
                spec.insert(key.clone(), RawEntry::Value(value.clone()))
            })
    }

    /// Deterministic hash of the plan contents.
    pub fn plan_hash(&self) -> Result<String, ResubError> {
        stable_hash_string(self)
    }
}

/// Parses a grid plan from YAML text.
pub fn grid_plan_from_yaml(text: &str) -> Result<GridPlan, ResubError> {
    from_yaml_slice(text.as_bytes())
}

/// Loads a grid plan from disk.
pub fn load_grid_plan<P: AsRef<Path>>(path: P) -> Result<GridPlan, ResubError> {
    let bytes = fs::read(path.as_ref()).map_err(|err| io_error("plan_read", err))?;
    from_yaml_slice(&bytes)
}
