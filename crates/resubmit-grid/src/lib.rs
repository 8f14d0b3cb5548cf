//! Job-grid construction: parameter expansion, derivation and uniqueness checks.

mod build;
mod expand;
mod export;
mod hash;
mod plan;
pub mod serde;
mod table;
mod unique;

pub use build::{build_table, create_jobs_table};
pub use expand::{
    classify, ColumnFn, ExpandedSpec, ParamSpec, PatternRule, RawEntry, SpecEntry, TransformFn,
};
pub use export::{write_table_csv, write_table_json};
pub use hash::{stable_hash_string, table_fingerprint};
pub use plan::{grid_plan_from_yaml, load_grid_plan, GridPlan};
pub use table::JobTable;
pub use unique::{ensure_unique_combinations, DuplicateGroup, DuplicateReport};

pub use crate::serde::{from_json_slice, to_canonical_json_bytes};
