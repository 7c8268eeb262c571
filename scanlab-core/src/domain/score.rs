//! Score breakdown — per-factor point contributions plus the total.
//!
//! The breakdown retains every factor's contribution (not just the sum) so a
//! pick can be audited after the fact. The total is always the exact sum of
//! the entries; scale clamps are recorded as their own entry to keep that
//! invariant honest.

use serde::{Deserialize, Serialize};

/// One factor's contribution to a scheme total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorPoints {
    pub factor: String,
    pub points: f64,
}

/// Ordered factor contributions for one (candidate, scheme) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub scheme: String,
    pub entries: Vec<FactorPoints>,
    pub total: f64,
}

impl ScoreBreakdown {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            entries: Vec::new(),
            total: 0.0,
        }
    }

    /// Append a factor contribution and fold it into the total.
    pub fn push(&mut self, factor: impl Into<String>, points: f64) {
        self.entries.push(FactorPoints {
            factor: factor.into(),
            points,
        });
        self.total += points;
    }

    /// Exact sum of the entries. Equals `total` by construction; exposed so
    /// tests can assert the invariant independently.
    pub fn entry_sum(&self) -> f64 {
        self.entries.iter().map(|e| e.points).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_tracks_entries() {
        let mut b = ScoreBreakdown::new("point_based");
        b.push("sector", 35.0);
        b.push("short_interest", 25.0);
        b.push("fresh", 18.0);
        assert_eq!(b.total, 78.0);
        assert_eq!(b.total, b.entry_sum());
    }

    #[test]
    fn negative_entries_allowed() {
        let mut b = ScoreBreakdown::new("legacy");
        b.push("base", 3.4);
        b.push("earnings_proximity", -0.2);
        assert!((b.total - 3.2).abs() < 1e-12);
    }

    #[test]
    fn serde_roundtrip_preserves_order() {
        let mut b = ScoreBreakdown::new("point_based");
        b.push("z_last", 1.0);
        b.push("a_first", 2.0);
        let json = serde_json::to_string(&b).unwrap();
        let back: ScoreBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(back.entries[0].factor, "z_last");
        assert_eq!(back, b);
    }
}
