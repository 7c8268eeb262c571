//! Position ledger — the one piece of shared mutable state.
//!
//! Linear state machine per position: Open → DueForExit → Closed, no
//! backward or skip transitions. The ledger only reports which tickers are
//! eligible for entry or exit; it never initiates orders. Single-writer
//! discipline is enforced by `&mut self` on every transition — callers
//! serialize access (one scheduled run at a time).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Position, PositionState};

/// Per-ticker ledger failure. Never blocks other tickers in the same run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("position already active for {0} (no pyramiding within a holding cycle)")]
    Conflict(String),

    #[error("no position due for exit for {0}")]
    NotFound(String),
}

/// All positions ever opened, active and closed. Persisted whole by the
/// caller (load at start, save at end) — every field round-trips.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionLedger {
    positions: Vec<Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new position. Fails if the ticker already has an active one.
    pub fn open(
        &mut self,
        ticker: &str,
        entry_date: NaiveDate,
        entry_price: f64,
    ) -> Result<(), LedgerError> {
        if self
            .positions
            .iter()
            .any(|p| p.ticker == ticker && p.is_active())
        {
            return Err(LedgerError::Conflict(ticker.to_string()));
        }
        self.positions.push(Position::open(ticker, entry_date, entry_price));
        Ok(())
    }

    /// Move every Open position held at least `holding_period_days` calendar
    /// days to DueForExit. Idempotent: already-due positions are untouched,
    /// so calling twice on the same date equals calling once.
    ///
    /// Returns the tickers that became due in this call.
    pub fn advance(&mut self, current_date: NaiveDate, holding_period_days: i64) -> Vec<String> {
        let mut newly_due = Vec::new();
        for position in &mut self.positions {
            if position.state == PositionState::Open
                && position.days_held(current_date) >= holding_period_days
            {
                position.state = PositionState::DueForExit;
                newly_due.push(position.ticker.clone());
            }
        }
        newly_due
    }

    /// Close the ticker's DueForExit position at the recorded fill price and
    /// compute the realized return.
    pub fn close(
        &mut self,
        ticker: &str,
        exit_date: NaiveDate,
        exit_price: f64,
    ) -> Result<f64, LedgerError> {
        let position = self
            .positions
            .iter_mut()
            .find(|p| p.ticker == ticker && p.state == PositionState::DueForExit)
            .ok_or_else(|| LedgerError::NotFound(ticker.to_string()))?;
        let realized = (exit_price - position.entry_price) / position.entry_price;
        position.state = PositionState::Closed;
        position.exit_date = Some(exit_date);
        position.exit_price = Some(exit_price);
        position.realized_return = Some(realized);
        Ok(realized)
    }

    /// Tickers currently awaiting an exit fill.
    pub fn due_for_exit(&self) -> Vec<&str> {
        self.positions
            .iter()
            .filter(|p| p.state == PositionState::DueForExit)
            .map(|p| p.ticker.as_str())
            .collect()
    }

    /// Tickers with an active (Open or DueForExit) position.
    pub fn active_tickers(&self) -> Vec<&str> {
        self.positions
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.ticker.as_str())
            .collect()
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
