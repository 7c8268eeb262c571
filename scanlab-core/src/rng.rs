//! Control-draw RNG — injected, seedable, hash-derived.
//!
//! The control cohort must be reproducible in tests and non-deterministic in
//! production. A `ControlRng` is either seeded (the per-run seed is derived
//! from a master seed and the run date via BLAKE3, independent of call
//! order) or drawn from OS entropy.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Pluggable random source for the control-cohort draw.
#[derive(Debug, Clone, Copy)]
pub enum ControlRng {
    /// Deterministic: same master seed + run date => same control cohort.
    Seeded(u64),
    /// Production: fresh OS entropy each run.
    Entropy,
}

impl ControlRng {
    /// Derive the per-run seed. Hash-based so it does not depend on how
    /// many draws earlier runs consumed.
    pub fn run_seed(&self, run_date: NaiveDate) -> u64 {
        match self {
            ControlRng::Seeded(master) => {
                let mut hasher = blake3::Hasher::new();
                hasher.update(&master.to_le_bytes());
                hasher.update(run_date.to_string().as_bytes());
                let hash = hasher.finalize();
                u64::from_le_bytes(hash.as_bytes()[..8].try_into().unwrap())
            }
            ControlRng::Entropy => rand::random(),
        }
    }

    /// Materialize an `StdRng` for one run's control draw.
    pub fn rng_for(&self, run_date: NaiveDate) -> StdRng {
        StdRng::seed_from_u64(self.run_seed(run_date))
    }
}
