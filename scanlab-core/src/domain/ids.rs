//! Deterministic run identification.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic run ID: BLAKE3 of (config hash, run date, seed).
///
/// Stable across builds and platforms, so two runs over the same config,
/// date, and seed can be recognized as identical after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn derive(config_hash: &str, run_date: NaiveDate, seed: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(config_hash.as_bytes());
        hasher.update(run_date.to_string().as_bytes());
        hasher.update(&seed.to_le_bytes());
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
