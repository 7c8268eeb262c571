//! Position — one holding cycle for one ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle state. Transitions are linear: Open → DueForExit → Closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionState {
    Open,
    DueForExit,
    Closed,
}

/// One position instance. A ticker may accumulate many closed positions
/// over time, but at most one Open/DueForExit at any instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub state: PositionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realized_return: Option<f64>,
}

impl Position {
    pub fn open(ticker: impl Into<String>, entry_date: NaiveDate, entry_price: f64) -> Self {
        Self {
            ticker: ticker.into(),
            entry_date,
            entry_price,
            state: PositionState::Open,
            exit_date: None,
            exit_price: None,
            realized_return: None,
        }
    }

    /// Still in its holding cycle (Open or DueForExit).
    pub fn is_active(&self) -> bool {
        matches!(self.state, PositionState::Open | PositionState::DueForExit)
    }

    /// Calendar days held as of `current_date`.
    pub fn days_held(&self, current_date: NaiveDate) -> i64 {
        (current_date - self.entry_date).num_days()
    }
}
