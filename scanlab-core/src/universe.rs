//! Universe filter — reduces the raw daily list to quality-eligible names.
//!
//! All rules are independent conjunctions; rejection order carries no
//! meaning. Pure: no side effects beyond the returned exclusion records.

use serde::{Deserialize, Serialize};

use crate::config::UniverseConfig;
use crate::domain::CandidateSnapshot;

/// Where in the pipeline a candidate was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionStage {
    Validation,
    Universe,
    Selector,
    Ledger,
}

/// One excluded candidate with its audit reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub ticker: String,
    pub stage: ExclusionStage,
    pub reason: String,
}

impl Exclusion {
    pub fn new(ticker: impl Into<String>, stage: ExclusionStage, reason: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            stage,
            reason: reason.into(),
        }
    }
}

/// First rule a candidate fails, if any. All rules must hold to pass.
fn first_failure(snap: &CandidateSnapshot, config: &UniverseConfig) -> Option<String> {
    if snap.market_cap < config.min_market_cap {
        return Some(format!(
            "market cap ${:.0}M below minimum ${:.0}M",
            snap.market_cap / 1e6,
            config.min_market_cap / 1e6
        ));
    }
    if snap.market_cap > config.max_market_cap {
        return Some(format!(
            "market cap ${:.1}B above maximum ${:.1}B",
            snap.market_cap / 1e9,
            config.max_market_cap / 1e9
        ));
    }
    if snap.price < config.min_price {
        return Some(format!(
            "price ${:.2} below minimum ${:.2}",
            snap.price, config.min_price
        ));
    }
    if snap.dollar_volume() < config.min_dollar_volume {
        return Some(format!(
            "dollar volume ${:.1}M below minimum ${:.1}M",
            snap.dollar_volume() / 1e6,
            config.min_dollar_volume / 1e6
        ));
    }
    if snap.return_7d_pct > config.max_pump_pct {
        return Some(format!(
            "already up {:+.1}% in 7 days (chasing risk, max {:.1}%)",
            snap.return_7d_pct, config.max_pump_pct
        ));
    }
    if snap.return_90d_pct < config.min_trend_pct {
        return Some(format!(
            "90-day return {:+.1}% below minimum {:+.1}% (downtrend)",
            snap.return_90d_pct, config.min_trend_pct
        ));
    }
    if let (Some(max_1d), Some(change_1d)) = (config.max_1d_pct, snap.return_1d_pct) {
        if change_1d > max_1d {
            return Some(format!(
                "already up {change_1d:+.1}% today (daily spike, max {max_1d:.1}%)"
            ));
        }
    }
    None
}

/// Split snapshots into quality-eligible candidates and audited exclusions.
pub fn filter(
    snapshots: Vec<CandidateSnapshot>,
    config: &UniverseConfig,
) -> (Vec<CandidateSnapshot>, Vec<Exclusion>) {
    let mut passed = Vec::with_capacity(snapshots.len());
    let mut excluded = Vec::new();
    for snap in snapshots {
        match first_failure(&snap, config) {
            None => passed.push(snap),
            Some(reason) => {
                excluded.push(Exclusion::new(&snap.ticker, ExclusionStage::Universe, reason))
            }
        }
    }
    (passed, excluded)
}
