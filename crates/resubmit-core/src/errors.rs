//! Structured error types shared across resubmit crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every leaf [`ResubError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (column names, row indices, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Coarse classification of an error, preserved through derivation wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// A value had the wrong shape for its position (e.g. not iterable).
    Type,
    /// A value had the right shape but an unacceptable content.
    Value,
    /// A user supplied function or an executor failed while running.
    Runtime,
    /// Reading, writing or talking to the outside world failed.
    Io,
}

/// Canonical error type for grid construction and job submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum ResubError {
    /// Malformed parameter specification or plan.
    #[error("configuration error: {0}")]
    Configuration(ErrorInfo),
    /// A computed column or transform failed; attributes the failure to its key.
    #[error("Error at key '{key}': {source}")]
    Derivation {
        /// Name of the specification entry that failed.
        key: String,
        /// Error raised by the entry's function.
        source: Box<ResubError>,
    },
    /// Duplicate key combinations found in a job table.
    #[error("uniqueness violation: {0}")]
    Uniqueness(ErrorInfo),
    /// A user supplied function failed.
    #[error("job error: {0}")]
    Job(ErrorInfo),
    /// The execution backend failed to accept, run or report a job.
    #[error("remote error: {0}")]
    Remote(ErrorInfo),
    /// Waiting for a debugger client failed.
    #[error("debugger error: {0}")]
    Debugger(ErrorInfo),
    /// Reading a confirmation answer failed.
    #[error("prompt error: {0}")]
    Prompt(ErrorInfo),
    /// Serialization, schema and file errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl ResubError {
    /// Wraps `source` so that it is attributed to the specification entry `key`.
    pub fn derivation(key: impl Into<String>, source: ResubError) -> Self {
        ResubError::Derivation {
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Shorthand for a failing user function.
    pub fn job(message: impl Into<String>) -> Self {
        ResubError::Job(ErrorInfo::new("job-failed", message))
    }

    /// Returns the innermost error, unwrapping any derivation layers.
    pub fn root(&self) -> &ResubError {
        match self {
            ResubError::Derivation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns the key of the outermost derivation layer, if any.
    pub fn derivation_key(&self) -> Option<&str> {
        match self {
            ResubError::Derivation { key, .. } => Some(key.as_str()),
            _ => None,
        }
    }

    /// Returns the classification of the underlying error.
    pub fn kind(&self) -> ErrorKind {
        self.leaf().1
    }

    /// Returns a reference to the payload describing the underlying error.
    pub fn info(&self) -> &ErrorInfo {
        self.leaf().0
    }

    fn leaf(&self) -> (&ErrorInfo, ErrorKind) {
        match self {
            ResubError::Derivation { source, .. } => source.leaf(),
            ResubError::Configuration(info) => (info, ErrorKind::Type),
            ResubError::Uniqueness(info) => (info, ErrorKind::Value),
            ResubError::Job(info) | ResubError::Remote(info) => (info, ErrorKind::Runtime),
            ResubError::Debugger(info) | ResubError::Prompt(info) | ResubError::Serde(info) => {
                (info, ErrorKind::Io)
            }
        }
    }
}
