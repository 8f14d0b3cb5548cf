use resubmit_core::errors::ResubError;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::serde::to_canonical_json_bytes;
use crate::table::JobTable;

/// Computes a stable SHA256 hash for the provided serializable value.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, ResubError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// Fingerprints a job table over its column order and every cell.
pub fn table_fingerprint(table: &JobTable) -> Result<String, ResubError> {
    stable_hash_string(&(table.columns(), table.rows()))
}
