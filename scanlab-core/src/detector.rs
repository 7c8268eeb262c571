//! Signal detector — per-candidate boolean signals.
//!
//! Pure function of one snapshot and the signal thresholds. Missing
//! social-mention data was already normalized to zero at validation, so a
//! quiet name reads as "no buzz" rather than being excluded.

use crate::config::SignalConfig;
use crate::domain::{CandidateSnapshot, SignalFlags};

/// Compute all signal flags for one candidate.
pub fn detect(snap: &CandidateSnapshot, config: &SignalConfig) -> SignalFlags {
    SignalFlags {
        is_fresh: is_fresh(snap, config),
        is_accelerating: is_accelerating(snap, config),
        catalyst_present: catalyst_present(snap, config),
    }
}

/// Fresh: the 7-day return sits inside the inclusive "not yet moved" band.
fn is_fresh(snap: &CandidateSnapshot, config: &SignalConfig) -> bool {
    snap.return_7d_pct >= config.fresh_min && snap.return_7d_pct <= config.fresh_max
}

/// Accelerating: either platform alone clearing its threshold suffices.
fn is_accelerating(snap: &CandidateSnapshot, config: &SignalConfig) -> bool {
    snap.twitter_mentions_24h >= config.min_twitter_mentions
        || snap.reddit_mentions >= config.min_reddit_mentions
}

/// Catalyst: an earnings date within the lookahead/lookback window, or a
/// material news event within the news lookback. Absent inputs are false.
fn catalyst_present(snap: &CandidateSnapshot, config: &SignalConfig) -> bool {
    let earnings_near = snap.earnings_days_until.is_some_and(|days| {
        days >= -config.earnings_lookback_days && days <= config.earnings_lookahead_days
    });
    let news_near = snap
        .news_event_days_ago
        .is_some_and(|days| days >= 0 && days <= config.news_lookback_days);
    earnings_near || news_near
}
