//! Classification of parameter specification entries.
//!
//! Keys follow a suffix convention: `<name>__callable` declares a computed
//! column, `<name>__regex` / `<name>_regex` a row filter on column `<name>`,
//! `<name>_transform` a full-table transform, and any other key a static
//! list of values. Each entry is classified exactly once into a
//! [`SpecEntry`].

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use resubmit_core::errors::{ErrorInfo, ResubError};
use serde_json::Value;

use crate::table::JobTable;

/// Function deriving one value per row from the in-progress table.
pub type ColumnFn = Arc<dyn Fn(&JobTable) -> Result<Vec<Value>, ResubError> + Send + Sync>;

/// Function replacing the whole table.
pub type TransformFn = Arc<dyn Fn(JobTable) -> Result<JobTable, ResubError> + Send + Sync>;

const CALLABLE_SUFFIX: &str = "__callable";
const REGEX_SUFFIXES: [&str; 2] = ["__regex", "_regex"];
const TRANSFORM_SUFFIX: &str = "_transform";
const EXCLUDE_PREFIX: &str = "!re:";

/// Value stored under a specification key before classification.
#[derive(Clone)]
pub enum RawEntry {
    /// Plain data: a list of values, or a pattern string for regex keys.
    Value(Value),
    /// Column function for `__callable` keys.
    Column(ColumnFn),
    /// Table function for `_transform` keys.
    Transform(TransformFn),
    /// Precompiled pattern for regex keys (inclusive match).
    Pattern(Regex),
}

impl RawEntry {
    /// Wraps a column function.
    pub fn column<F>(func: F) -> Self
    where
        F: Fn(&JobTable) -> Result<Vec<Value>, ResubError> + Send + Sync + 'static,
    {
        RawEntry::Column(Arc::new(func))
    }

    /// Wraps a table transform.
    pub fn transform<F>(func: F) -> Self
    where
        F: Fn(JobTable) -> Result<JobTable, ResubError> + Send + Sync + 'static,
    {
        RawEntry::Transform(Arc::new(func))
    }

    fn describe(&self) -> String {
        match self {
            RawEntry::Value(value) => value.to_string(),
            RawEntry::Column(_) => "<column function>".to_string(),
            RawEntry::Transform(_) => "<transform function>".to_string(),
            RawEntry::Pattern(regex) => format!("<pattern {}>", regex.as_str()),
        }
    }
}

impl fmt::Debug for RawEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<Value> for RawEntry {
    fn from(value: Value) -> Self {
        RawEntry::Value(value)
    }
}

impl From<Regex> for RawEntry {
    fn from(regex: Regex) -> Self {
        RawEntry::Pattern(regex)
    }
}

/// Row predicate bound to a column value.
#[derive(Debug, Clone)]
pub struct PatternRule {
    regex: Regex,
    exclude: bool,
}

impl PatternRule {
    /// Parses a pattern string; a `!re:` prefix turns the rule into an exclusion.
    pub fn parse(pattern: &str) -> Result<Self, regex::Error> {
        match pattern.strip_prefix(EXCLUDE_PREFIX) {
            Some(rest) => Ok(Self {
                regex: Regex::new(rest)?,
                exclude: true,
            }),
            None => Ok(Self {
                regex: Regex::new(pattern)?,
                exclude: false,
            }),
        }
    }

    /// Inclusive rule over an already compiled pattern.
    pub fn include(regex: Regex) -> Self {
        Self {
            regex,
            exclude: false,
        }
    }

    /// Returns true when a row whose column renders as `text` is kept.
    pub fn keeps(&self, text: &str) -> bool {
        self.regex.is_match(text) != self.exclude
    }

    /// Returns true for `!re:` rules.
    pub fn is_exclusion(&self) -> bool {
        self.exclude
    }

    /// Underlying pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// A classified specification entry.
#[derive(Clone)]
pub enum SpecEntry {
    /// Finite list of values forming one cartesian axis.
    Static { name: String, values: Vec<Value> },
    /// Column derived after the base grid exists.
    Computed { name: String, func: ColumnFn },
    /// Row filter on an existing static column.
    RegexFilter { column: String, rule: PatternRule },
    /// Replacement of the whole table, applied last.
    Transform { name: String, func: TransformFn },
}

impl fmt::Debug for SpecEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecEntry::Static { name, values } => f
                .debug_struct("Static")
                .field("name", name)
                .field("values", values)
                .finish(),
            SpecEntry::Computed { name, .. } => {
                f.debug_struct("Computed").field("name", name).finish_non_exhaustive()
            }
            SpecEntry::RegexFilter { column, rule } => f
                .debug_struct("RegexFilter")
                .field("column", column)
                .field("rule", rule)
                .finish(),
            SpecEntry::Transform { name, .. } => {
                f.debug_struct("Transform").field("name", name).finish_non_exhaustive()
            }
        }
    }
}

enum Shape {
    Static,
    Computed,
    Regex,
    Transform,
}

fn split_key(key: &str) -> (Shape, &str) {
    if let Some(name) = key.strip_suffix(CALLABLE_SUFFIX) {
        return (Shape::Computed, name);
    }
    for suffix in REGEX_SUFFIXES {
        if let Some(name) = key.strip_suffix(suffix) {
            return (Shape::Regex, name);
        }
    }
    if let Some(name) = key.strip_suffix(TRANSFORM_SUFFIX) {
        return (Shape::Transform, name);
    }
    (Shape::Static, key)
}

fn config_error(code: &str, key: &str, message: String) -> ResubError {
    ResubError::Configuration(ErrorInfo::new(code, message).with_context("key", key))
}

/// Classifies one specification entry by key suffix and value shape.
pub fn classify(key: &str, raw: &RawEntry) -> Result<SpecEntry, ResubError> {
    let (shape, name) = split_key(key);
    if name.is_empty() {
        return Err(config_error(
            "empty-name",
            key,
            format!("'{key}' does not name a column"),
        ));
    }
    let name = name.to_string();
    match (shape, raw) {
        (Shape::Static, RawEntry::Value(Value::Array(values))) => Ok(SpecEntry::Static {
            name,
            values: values.clone(),
        }),
        (Shape::Static, other) => Err(config_error(
            "not-iterable",
            key,
            format!("'{key}' = {} is not iterable", other.describe()),
        )),
        (Shape::Computed, RawEntry::Column(func)) => Ok(SpecEntry::Computed {
            name,
            func: Arc::clone(func),
        }),
        (Shape::Computed, other) => Err(config_error(
            "not-callable",
            key,
            format!("'{key}' = {} is not a column function", other.describe()),
        )),
        (Shape::Transform, RawEntry::Transform(func)) => Ok(SpecEntry::Transform {
            name,
            func: Arc::clone(func),
        }),
        (Shape::Transform, other) => Err(config_error(
            "not-callable",
            key,
            format!("'{key}' = {} is not a transform function", other.describe()),
        )),
        (Shape::Regex, RawEntry::Pattern(regex)) => Ok(SpecEntry::RegexFilter {
            column: name,
            rule: PatternRule::include(regex.clone()),
        }),
        (Shape::Regex, RawEntry::Value(Value::String(pattern))) => {
            let rule = PatternRule::parse(pattern).map_err(|err| {
                ResubError::Configuration(
                    ErrorInfo::new("invalid-pattern", format!("'{key}' is not a valid pattern"))
                        .with_context("key", key)
                        .with_hint(err.to_string()),
                )
            })?;
            Ok(SpecEntry::RegexFilter { column: name, rule })
        }
        (Shape::Regex, other) => Err(config_error(
            "not-a-pattern",
            key,
            format!("'{key}' = {} is not a pattern", other.describe()),
        )),
    }
}

/// Classified specification, split by stage and kept in declaration order.
#[derive(Clone, Default)]
pub struct ExpandedSpec {
    pub statics: Vec<(String, Vec<Value>)>,
    pub filters: Vec<(String, PatternRule)>,
    pub computed: Vec<(String, ColumnFn)>,
    pub transforms: Vec<(String, TransformFn)>,
}

impl fmt::Debug for ExpandedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let computed: Vec<&str> = self.computed.iter().map(|(name, _)| name.as_str()).collect();
        let transforms: Vec<&str> = self
            .transforms
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        f.debug_struct("ExpandedSpec")
            .field("statics", &self.statics)
            .field("filters", &self.filters)
            .field("computed", &computed)
            .field("transforms", &transforms)
            .finish()
    }
}

/// Insertion-ordered parameter specification.
///
/// Re-inserting a key replaces its entry without moving it.
#[derive(Clone, Default)]
pub struct ParamSpec {
    entries: IndexMap<String, RawEntry>,
}

impl ParamSpec {
    /// Empty specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a raw entry under `key`; the key suffix decides its meaning.
    pub fn insert(mut self, key: impl Into<String>, entry: impl Into<RawEntry>) -> Self {
        self.entries.insert(key.into(), entry.into());
        self
    }

    /// Static list of values for column `name`.
    pub fn values<I, V>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list = Value::Array(values.into_iter().map(Into::into).collect());
        self.insert(name, list)
    }

    /// Computed column `name`, stored under `<name>__callable`.
    pub fn computed<F>(self, name: &str, func: F) -> Self
    where
        F: Fn(&JobTable) -> Result<Vec<Value>, ResubError> + Send + Sync + 'static,
    {
        self.insert(format!("{name}{CALLABLE_SUFFIX}"), RawEntry::column(func))
    }

    /// Inclusive pattern filter on column `name`, stored under `<name>__regex`.
    pub fn regex(self, name: &str, regex: Regex) -> Self {
        self.insert(format!("{name}{}", REGEX_SUFFIXES[0]), regex)
    }

    /// Transform `name`, stored under `<name>_transform`.
    pub fn transform<F>(self, name: &str, func: F) -> Self
    where
        F: Fn(JobTable) -> Result<JobTable, ResubError> + Send + Sync + 'static,
    {
        self.insert(format!("{name}{TRANSFORM_SUFFIX}"), RawEntry::transform(func))
    }

    /// Classifies every entry and groups them by stage.
    pub fn expand(&self) -> Result<ExpandedSpec, ResubError> {
        let mut expanded = ExpandedSpec::default();
        for (key, raw) in &self.entries {
            match classify(key, raw)? {
                SpecEntry::Static { name, values } => expanded.statics.push((name, values)),
                SpecEntry::Computed { name, func } => expanded.computed.push((name, func)),
                SpecEntry::RegexFilter { column, rule } => expanded.filters.push((column, rule)),
                SpecEntry::Transform { name, func } => expanded.transforms.push((name, func)),
            }
        }
        Ok(expanded)
    }
}

impl fmt::Debug for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}
