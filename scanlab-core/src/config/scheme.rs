//! Scoring scheme configuration — the tagged variants the scorer runs on.
//!
//! Two schemes ship as defaults: `point_based` (the newer unbounded point
//! model) and `legacy` (the 1–5 weighted composite with boosts). Both are
//! plain data; the scorer is one pure function parameterized by whichever
//! variant it is handed, so any number of schemes can be computed for the
//! same snapshot without interference.

use serde::{Deserialize, Serialize};

use crate::domain::{CandidateSnapshot, CapBucket, SignalFlags};

use super::bucket::{bucket, BucketTable};
use super::ConfigError;

/// Which snapshot field a numeric bucket table reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericInput {
    Return1dPct,
    Return7dPct,
    Return90dPct,
    ShortInterestPct,
    Dist52wHighPct,
    VolumeRatio,
    TwitterMentions,
    RedditMentions,
    FundamentalQuality,
    EarningsDaysUntil,
}

impl NumericInput {
    /// Extract the input from a snapshot. `None` means "missing", which
    /// scores the table default rather than erroring.
    pub fn extract(self, snap: &CandidateSnapshot) -> Option<f64> {
        match self {
            NumericInput::Return1dPct => snap.return_1d_pct,
            NumericInput::Return7dPct => Some(snap.return_7d_pct),
            NumericInput::Return90dPct => Some(snap.return_90d_pct),
            NumericInput::ShortInterestPct => snap.short_interest_pct,
            NumericInput::Dist52wHighPct => snap.dist_52w_high_pct,
            NumericInput::VolumeRatio => Some(snap.volume_ratio()),
            NumericInput::TwitterMentions => Some(snap.twitter_mentions_24h as f64),
            NumericInput::RedditMentions => Some(snap.reddit_mentions as f64),
            NumericInput::FundamentalQuality => snap.fundamental_quality,
            NumericInput::EarningsDaysUntil => snap.earnings_days_until.map(|d| d as f64),
        }
    }
}

/// A named numeric factor: one input, one bucket table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericFactor {
    pub name: String,
    pub input: NumericInput,
    pub table: BucketTable,
}

/// Sector points, with an optional mid-cap override (the validated edge
/// rated mid-cap Healthcare above the rest of the sector).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorPoints {
    pub sector: String,
    pub points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midcap_points: Option<f64>,
}

/// Categorical sector table. Sectors not listed score the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorTable {
    pub entries: Vec<SectorPoints>,
    #[serde(default)]
    pub default_points: f64,
}

impl SectorTable {
    pub fn lookup(&self, sector: &str, cap: CapBucket) -> f64 {
        self.entries
            .iter()
            .find(|e| e.sector == sector)
            .map(|e| match (cap, e.midcap_points) {
                (CapBucket::Mid, Some(p)) => p,
                _ => e.points,
            })
            .unwrap_or(self.default_points)
    }
}

/// Points per market-cap size bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapTable {
    pub small: f64,
    pub mid: f64,
    pub large: f64,
    pub mega: f64,
}

impl CapTable {
    pub fn lookup(&self, cap: CapBucket) -> f64 {
        match cap {
            CapBucket::Small => self.small,
            CapBucket::Mid => self.mid,
            CapBucket::Large => self.large,
            CapBucket::Mega => self.mega,
        }
    }
}

/// The point-based scheme: sector + cap categorical factors, then an
/// ordered list of numeric bucket factors. Factors sum; scale is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointScheme {
    pub sector: SectorTable,
    pub market_cap: CapTable,
    pub factors: Vec<NumericFactor>,
}

/// One weighted factor of the legacy composite: the bucket table maps the
/// input to a 1–5 sub-score, which is then multiplied by the weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedFactor {
    pub name: String,
    pub weight: f64,
    pub input: NumericInput,
    pub table: BucketTable,
}

/// Trigger predicate for a boost/penalty row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoostTrigger {
    IsFresh,
    IsAccelerating,
    CatalystPresent,
    FundamentalQualityAbove { threshold: f64 },
    /// Earnings strictly within the next `days` days (0 <= until < days).
    EarningsWithinDays { days: i64 },
}

impl BoostTrigger {
    pub fn fires(self, snap: &CandidateSnapshot, flags: &SignalFlags) -> bool {
        match self {
            BoostTrigger::IsFresh => flags.is_fresh,
            BoostTrigger::IsAccelerating => flags.is_accelerating,
            BoostTrigger::CatalystPresent => flags.catalyst_present,
            BoostTrigger::FundamentalQualityAbove { threshold } => snap
                .fundamental_quality
                .map(|q| q > threshold)
                .unwrap_or(false),
            BoostTrigger::EarningsWithinDays { days } => snap
                .earnings_days_until
                .map(|d| (0..days).contains(&d))
                .unwrap_or(false),
        }
    }
}

/// Additive boost or penalty, applied after the weighted base sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    pub name: String,
    pub trigger: BoostTrigger,
    pub delta: f64,
}

/// The legacy composite scheme: weighted 1–5 sub-scores, boosts, then a
/// clamp to `[clamp_min, clamp_max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScheme {
    pub factors: Vec<WeightedFactor>,
    #[serde(default)]
    pub boosts: Vec<Boost>,
    pub clamp_min: f64,
    pub clamp_max: f64,
}

/// Tagged scheme variant the scorer dispatches on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scheme {
    PointBased(PointScheme),
    Composite(CompositeScheme),
}

/// A scheme paired with its id (e.g. "legacy", "point_based").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedScheme {
    pub id: String,
    #[serde(flatten)]
    pub scheme: Scheme,
}

impl NamedScheme {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.scheme {
            Scheme::PointBased(p) => {
                for f in &p.factors {
                    f.table.validate(&format!("{}.{}", self.id, f.name))?;
                }
            }
            Scheme::Composite(c) => {
                for f in &c.factors {
                    f.table.validate(&format!("{}.{}", self.id, f.name))?;
                    if !(f.weight.is_finite() && f.weight > 0.0) {
                        return Err(ConfigError::BadWeight {
                            scheme: self.id.clone(),
                            factor: f.name.clone(),
                        });
                    }
                }
                let weight_sum: f64 = c.factors.iter().map(|f| f.weight).sum();
                if (weight_sum - 1.0).abs() > 1e-9 {
                    return Err(ConfigError::WeightsDoNotSum {
                        scheme: self.id.clone(),
                        sum: weight_sum,
                    });
                }
                if c.clamp_min >= c.clamp_max {
                    return Err(ConfigError::BadClamp {
                        scheme: self.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ── Default schemes (the two validated eras) ─────────────────────────

/// Whole-table shorthand: half-open ascending buckets from (lo, hi, points)
/// triples, unbounded below the first entry if `open_low` is set.
fn table(default_points: f64, buckets: Vec<super::bucket::Bucket>) -> BucketTable {
    BucketTable {
        buckets,
        default_points,
    }
}

impl NamedScheme {
    /// The point-based scheme with the validated factor tables.
    pub fn default_point_based() -> Self {
        let sector = SectorTable {
            entries: vec![
                SectorPoints {
                    sector: "Healthcare".into(),
                    points: 25.0,
                    midcap_points: Some(40.0),
                },
                SectorPoints {
                    sector: "Industrials".into(),
                    points: 35.0,
                    midcap_points: None,
                },
                SectorPoints {
                    sector: "Real Estate".into(),
                    points: 30.0,
                    midcap_points: None,
                },
                SectorPoints {
                    sector: "Basic Materials".into(),
                    points: 25.0,
                    midcap_points: None,
                },
                SectorPoints {
                    sector: "Communication Services".into(),
                    points: 20.0,
                    midcap_points: None,
                },
                SectorPoints {
                    sector: "Technology".into(),
                    points: 15.0,
                    midcap_points: None,
                },
            ],
            default_points: 0.0,
        };

        let market_cap = CapTable {
            small: 15.0,
            mid: 25.0,
            large: 8.0,
            mega: 0.0,
        };

        let factors = vec![
            NumericFactor {
                name: "short_interest".into(),
                input: NumericInput::ShortInterestPct,
                table: table(
                    0.0,
                    vec![
                        bucket(Some(2.0), true, Some(5.0), false, 20.0),
                        bucket(Some(5.0), true, Some(10.0), false, 25.0),
                        bucket(Some(10.0), true, Some(15.0), false, 10.0),
                    ],
                ),
            },
            NumericFactor {
                name: "fresh_7d".into(),
                input: NumericInput::Return7dPct,
                table: table(
                    0.0,
                    vec![
                        bucket(None, true, Some(0.0), false, 20.0),
                        bucket(Some(0.0), true, Some(2.0), true, 18.0),
                        bucket(Some(2.0), false, Some(4.0), true, 12.0),
                    ],
                ),
            },
            NumericFactor {
                name: "dist_52w_high".into(),
                input: NumericInput::Dist52wHighPct,
                table: table(
                    0.0,
                    vec![
                        bucket(Some(-50.0), true, Some(-40.0), false, 8.0),
                        bucket(Some(-40.0), true, Some(-10.0), true, 15.0),
                    ],
                ),
            },
            NumericFactor {
                name: "volume_trend".into(),
                input: NumericInput::VolumeRatio,
                table: table(
                    0.0,
                    vec![
                        bucket(Some(0.7), true, Some(1.0), false, 10.0),
                        bucket(Some(1.0), true, None, false, 15.0),
                    ],
                ),
            },
            NumericFactor {
                name: "twitter_buzz".into(),
                input: NumericInput::TwitterMentions,
                table: table(
                    0.0,
                    vec![
                        bucket(Some(20.0), true, Some(25.0), false, 3.0),
                        bucket(Some(25.0), true, None, false, 5.0),
                    ],
                ),
            },
        ];

        NamedScheme {
            id: "point_based".into(),
            scheme: Scheme::PointBased(PointScheme {
                sector,
                market_cap,
                factors,
            }),
        }
    }

    /// The legacy 1–5 composite: fundamentals 35%, technicals 25%,
    /// sentiment 20%, risk 20%, with the boost/penalty table applied after
    /// the weighted base and the result clamped to [1, 5].
    pub fn default_legacy() -> Self {
        let factors = vec![
            WeightedFactor {
                name: "fundamentals".into(),
                weight: 0.35,
                input: NumericInput::FundamentalQuality,
                table: table(
                    3.0,
                    vec![
                        bucket(Some(0.0), true, Some(0.3), false, 2.0),
                        bucket(Some(0.3), true, Some(0.5), false, 3.0),
                        bucket(Some(0.5), true, Some(0.7), false, 4.0),
                        bucket(Some(0.7), true, Some(1.0), true, 5.0),
                    ],
                ),
            },
            WeightedFactor {
                name: "technicals".into(),
                weight: 0.25,
                input: NumericInput::Return90dPct,
                table: table(
                    3.0,
                    vec![
                        bucket(None, true, Some(0.0), false, 2.0),
                        bucket(Some(0.0), true, Some(10.0), false, 3.0),
                        bucket(Some(10.0), true, Some(25.0), false, 4.0),
                        bucket(Some(25.0), true, None, false, 5.0),
                    ],
                ),
            },
            WeightedFactor {
                name: "sentiment".into(),
                weight: 0.20,
                input: NumericInput::TwitterMentions,
                table: table(
                    3.0,
                    vec![
                        bucket(Some(0.0), true, Some(10.0), false, 2.0),
                        bucket(Some(10.0), true, Some(20.0), false, 3.0),
                        bucket(Some(20.0), true, Some(40.0), false, 4.0),
                        bucket(Some(40.0), true, None, false, 5.0),
                    ],
                ),
            },
            WeightedFactor {
                name: "risk".into(),
                weight: 0.20,
                input: NumericInput::ShortInterestPct,
                table: table(
                    3.0,
                    vec![
                        bucket(Some(0.0), true, Some(5.0), false, 5.0),
                        bucket(Some(5.0), true, Some(10.0), false, 4.0),
                        bucket(Some(10.0), true, Some(20.0), false, 3.0),
                        bucket(Some(20.0), true, None, false, 1.0),
                    ],
                ),
            },
        ];

        let boosts = vec![
            Boost {
                name: "fresh_edge".into(),
                trigger: BoostTrigger::IsFresh,
                delta: 0.5,
            },
            Boost {
                name: "quality".into(),
                trigger: BoostTrigger::FundamentalQualityAbove { threshold: 0.7 },
                delta: 0.5,
            },
            Boost {
                name: "catalyst".into(),
                trigger: BoostTrigger::CatalystPresent,
                delta: 0.4,
            },
            Boost {
                name: "earnings_proximity".into(),
                trigger: BoostTrigger::EarningsWithinDays { days: 7 },
                delta: -0.2,
            },
        ];

        NamedScheme {
            id: "legacy".into(),
            scheme: Scheme::Composite(CompositeScheme {
                factors,
                boosts,
                clamp_min: 1.0,
                clamp_max: 5.0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> CandidateSnapshot {
        CandidateSnapshot {
            ticker: "SOFI".into(),
            price: 9.80,
            market_cap: 9.5e9,
            sector: "Financial Services".into(),
            short_interest_pct: Some(12.0),
            return_1d_pct: Some(0.4),
            return_7d_pct: 1.5,
            return_90d_pct: 8.0,
            dist_52w_high_pct: Some(-18.0),
            twitter_mentions_24h: 22,
            reddit_mentions: 3,
            volume: 30_000_000,
            avg_volume: 28_000_000,
            earnings_days_until: Some(12),
            news_event_days_ago: None,
            fundamental_quality: Some(0.55),
        }
    }

    #[test]
    fn default_schemes_validate() {
        NamedScheme::default_point_based().validate().unwrap();
        NamedScheme::default_legacy().validate().unwrap();
    }

    #[test]
    fn sector_table_midcap_override() {
        let NamedScheme { scheme, .. } = NamedScheme::default_point_based();
        let Scheme::PointBased(p) = scheme else {
            panic!("expected point scheme")
        };
        assert_eq!(p.sector.lookup("Healthcare", CapBucket::Mid), 40.0);
        assert_eq!(p.sector.lookup("Healthcare", CapBucket::Small), 25.0);
        assert_eq!(p.sector.lookup("Financial Services", CapBucket::Mid), 0.0);
    }

    #[test]
    fn composite_weights_must_sum_to_one() {
        let mut scheme = NamedScheme::default_legacy();
        if let Scheme::Composite(ref mut c) = scheme.scheme {
            c.factors[0].weight = 0.5;
        }
        assert!(matches!(
            scheme.validate(),
            Err(ConfigError::WeightsDoNotSum { .. })
        ));
    }

    #[test]
    fn earnings_trigger_window_is_half_open() {
        let trigger = BoostTrigger::EarningsWithinDays { days: 7 };
        let mut snap = sample_snapshot();
        let flags = SignalFlags::default();

        snap.earnings_days_until = Some(0);
        assert!(trigger.fires(&snap, &flags));
        snap.earnings_days_until = Some(6);
        assert!(trigger.fires(&snap, &flags));
        snap.earnings_days_until = Some(7);
        assert!(!trigger.fires(&snap, &flags));
        snap.earnings_days_until = Some(-1);
        assert!(!trigger.fires(&snap, &flags));
        snap.earnings_days_until = None;
        assert!(!trigger.fires(&snap, &flags));
    }

    #[test]
    fn scheme_toml_roundtrip() {
        let scheme = NamedScheme::default_point_based();
        let text = toml::to_string(&scheme).unwrap();
        let back: NamedScheme = toml::from_str(&text).unwrap();
        assert_eq!(back, scheme);
    }
}
