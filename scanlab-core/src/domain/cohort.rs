//! Cohort — one run's selected and control tickers with entry stamps.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::score::ScoreBreakdown;

/// Which group a cohort entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortGroup {
    Primary,
    Control,
}

/// One selected (or control-drawn) ticker, stamped with the run's date and
/// the snapshot price as entry price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortEntry {
    pub ticker: String,
    pub group: CohortGroup,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    /// Full per-scheme breakdowns. Populated for primary entries; control
    /// entries carry whatever was computed for them (possibly empty).
    pub breakdowns: Vec<ScoreBreakdown>,
}

/// A run's output: ordered primary cohort plus a disjoint control cohort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cohort {
    pub run_date: NaiveDate,
    pub primary: Vec<CohortEntry>,
    pub control: Vec<CohortEntry>,
}

impl Cohort {
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.control.is_empty()
    }

    pub fn primary_tickers(&self) -> impl Iterator<Item = &str> {
        self.primary.iter().map(|e| e.ticker.as_str())
    }

    pub fn control_tickers(&self) -> impl Iterator<Item = &str> {
        self.control.iter().map(|e| e.ticker.as_str())
    }

    /// Primary and control must never share a ticker.
    pub fn is_disjoint(&self) -> bool {
        self.primary
            .iter()
            .all(|p| self.control.iter().all(|c| c.ticker != p.ticker))
    }
}
