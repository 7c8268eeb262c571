//! Candidate snapshot — the fundamental per-stock input unit.
//!
//! A `RawSnapshot` is one row as delivered by the data collaborators, with
//! every field optional. `validate()` promotes it to a `CandidateSnapshot`
//! or names exactly which required field is missing/invalid so the candidate
//! can be excluded with an auditable reason rather than aborting the run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failure for a single candidate. Never aborts a run — the
/// candidate is excluded and the reason recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: String },
}

/// Market-cap size bucket, cut at 2B / 10B / 50B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapBucket {
    /// Below $2B.
    Small,
    /// $2B to $10B.
    Mid,
    /// $10B to $50B.
    Large,
    /// $50B and above.
    Mega,
}

impl CapBucket {
    pub fn from_market_cap(market_cap: f64) -> Self {
        if market_cap < 2e9 {
            CapBucket::Small
        } else if market_cap < 10e9 {
            CapBucket::Mid
        } else if market_cap < 50e9 {
            CapBucket::Large
        } else {
            CapBucket::Mega
        }
    }
}

/// One candidate row as ingested, before validation. All fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub ticker: Option<String>,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub short_interest_pct: Option<f64>,
    pub return_1d_pct: Option<f64>,
    pub return_7d_pct: Option<f64>,
    pub return_90d_pct: Option<f64>,
    pub dist_52w_high_pct: Option<f64>,
    pub twitter_mentions_24h: Option<u32>,
    pub reddit_mentions: Option<u32>,
    pub volume: Option<u64>,
    pub avg_volume: Option<u64>,
    pub earnings_days_until: Option<i64>,
    pub news_event_days_ago: Option<i64>,
    pub fundamental_quality: Option<f64>,
}

impl RawSnapshot {
    /// Promote to a validated snapshot, or name the first failing field.
    ///
    /// Missing social-mention counts normalize to zero ("no buzz"), not an
    /// error — only price/cap/sector/returns/volume are required.
    pub fn validate(self) -> Result<CandidateSnapshot, ValidationError> {
        let ticker = self
            .ticker
            .filter(|t| !t.is_empty())
            .ok_or(ValidationError::MissingField("ticker"))?;
        let price = require_finite("price", self.price)?;
        if price <= 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "price",
                value: price.to_string(),
            });
        }
        let market_cap = require_finite("market_cap", self.market_cap)?;
        if market_cap < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "market_cap",
                value: market_cap.to_string(),
            });
        }
        let sector = self
            .sector
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingField("sector"))?;
        let return_7d_pct = require_finite("return_7d_pct", self.return_7d_pct)?;
        let return_90d_pct = require_finite("return_90d_pct", self.return_90d_pct)?;
        let volume = self.volume.ok_or(ValidationError::MissingField("volume"))?;
        let avg_volume = self
            .avg_volume
            .ok_or(ValidationError::MissingField("avg_volume"))?;

        Ok(CandidateSnapshot {
            ticker,
            price,
            market_cap,
            sector,
            short_interest_pct: self.short_interest_pct.filter(|v| v.is_finite()),
            return_1d_pct: self.return_1d_pct.filter(|v| v.is_finite()),
            return_7d_pct,
            return_90d_pct,
            dist_52w_high_pct: self.dist_52w_high_pct.filter(|v| v.is_finite()),
            twitter_mentions_24h: self.twitter_mentions_24h.unwrap_or(0),
            reddit_mentions: self.reddit_mentions.unwrap_or(0),
            volume,
            avg_volume,
            earnings_days_until: self.earnings_days_until,
            news_event_days_ago: self.news_event_days_ago,
            fundamental_quality: self.fundamental_quality.filter(|v| v.is_finite()),
        })
    }
}

fn require_finite(field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
    let v = value.ok_or(ValidationError::MissingField(field))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value: v.to_string(),
        })
    }
}

/// Validated per-run input for one candidate. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSnapshot {
    pub ticker: String,
    pub price: f64,
    pub market_cap: f64,
    pub sector: String,
    pub short_interest_pct: Option<f64>,
    pub return_1d_pct: Option<f64>,
    pub return_7d_pct: f64,
    pub return_90d_pct: f64,
    /// Distance from the 52-week high, as a (usually negative) percentage.
    pub dist_52w_high_pct: Option<f64>,
    pub twitter_mentions_24h: u32,
    /// Strict symbol-matched Reddit count from the social collaborator.
    pub reddit_mentions: u32,
    pub volume: u64,
    pub avg_volume: u64,
    /// Signed days until the next earnings date (negative = just reported).
    pub earnings_days_until: Option<i64>,
    /// Days since the last material news event, per the news collaborator.
    pub news_event_days_ago: Option<i64>,
    /// Fundamental quality in [0, 1] from the fundamentals collaborator.
    pub fundamental_quality: Option<f64>,
}

impl CandidateSnapshot {
    /// Average daily traded value in dollars.
    pub fn dollar_volume(&self) -> f64 {
        self.avg_volume as f64 * self.price
    }

    /// Today's volume relative to the average. Zero average yields 0.
    pub fn volume_ratio(&self) -> f64 {
        if self.avg_volume == 0 {
            0.0
        } else {
            self.volume as f64 / self.avg_volume as f64
        }
    }

    pub fn cap_bucket(&self) -> CapBucket {
        CapBucket::from_market_cap(self.market_cap)
    }
}
