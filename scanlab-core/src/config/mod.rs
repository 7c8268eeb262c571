//! Scan configuration — one versioned TOML artifact per deployment.
//!
//! Every numeric threshold that used to live in narrative docs is here:
//! universe bounds, signal bands, scheme bucket tables, banned sectors,
//! cohort sizes. The whole structure is validated at load time so a gap or
//! overlap in a bucket table is a fatal `ConfigError` before any candidate
//! is scored, never a silent mis-score at run time.

pub mod bucket;
pub mod scheme;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub use bucket::{Bucket, BucketTable};
pub use scheme::{
    Boost, BoostTrigger, CapTable, CompositeScheme, NamedScheme, NumericFactor, NumericInput,
    PointScheme, Scheme, SectorPoints, SectorTable, WeightedFactor,
};

/// Fatal configuration error. Aborts before any run: with a broken scheme
/// table every candidate would be scored incorrectly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("read config: {0}")]
    Io(String),

    #[error("parse config: {0}")]
    Parse(String),

    #[error("table {table}: bucket {index} overlaps its neighbor")]
    OverlappingBuckets { table: String, index: usize },

    #[error("table {table}: gap between bucket {index} and the next")]
    BucketGap { table: String, index: usize },

    #[error("table {table}: bucket {index} is empty")]
    EmptyBucket { table: String, index: usize },

    #[error("table {table}: bucket {index} has non-finite points")]
    NonFinitePoints { table: String, index: usize },

    #[error("scheme {scheme}: factor {factor} has a non-positive weight")]
    BadWeight { scheme: String, factor: String },

    #[error("scheme {scheme}: factor weights sum to {sum}, expected 1.0")]
    WeightsDoNotSum { scheme: String, sum: f64 },

    #[error("scheme {scheme}: clamp_min must be below clamp_max")]
    BadClamp { scheme: String },

    #[error("duplicate scheme id: {0}")]
    DuplicateScheme(String),

    #[error("selection scheme {0} is not defined")]
    UnknownSelectionScheme(String),

    #[error("universe: {0}")]
    BadUniverseBound(String),

    #[error("signals: fresh_min {min} above fresh_max {max}")]
    BadFreshBand { min: f64, max: f64 },

    #[error("selector: {0}")]
    BadSelector(String),
}

/// Quality-eligibility bounds for the universe filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseConfig {
    pub min_market_cap: f64,
    pub max_market_cap: f64,
    pub min_price: f64,
    /// Minimum average daily traded value, dollars.
    pub min_dollar_volume: f64,
    /// Reject already-pumped names: 7-day return must not exceed this.
    pub max_pump_pct: f64,
    /// Reject persistent downtrends: 90-day return must be at least this.
    pub min_trend_pct: f64,
    /// Optional daily-spike bound; skipped when the 1-day return is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_1d_pct: Option<f64>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            min_market_cap: 500e6,
            max_market_cap: 1e15,
            min_price: 5.0,
            min_dollar_volume: 2e6,
            max_pump_pct: 20.0,
            min_trend_pct: 0.0,
            max_1d_pct: Some(12.0),
        }
    }
}

/// Signal-detector thresholds. The fresh band is era-specific configuration,
/// not code: the legacy era ran −5..+5, the point-based era 0..+5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Inclusive fresh band over the 7-day return.
    pub fresh_min: f64,
    pub fresh_max: f64,
    pub min_twitter_mentions: u32,
    pub min_reddit_mentions: u32,
    /// Catalyst window: earnings up to this many days ahead...
    pub earnings_lookahead_days: i64,
    /// ...or this many days behind.
    pub earnings_lookback_days: i64,
    /// News events within this many days count as catalysts.
    pub news_lookback_days: i64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            fresh_min: -5.0,
            fresh_max: 5.0,
            min_twitter_mentions: 20,
            min_reddit_mentions: 2,
            earnings_lookahead_days: 14,
            earnings_lookback_days: 2,
            news_lookback_days: 7,
        }
    }
}

/// Selector configuration: cohort sizes, sector bans, optional gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Primary cohort size (top N by the selection scheme's total).
    pub cohort_size: usize,
    /// Control cohort size, drawn from the eligible universe.
    pub control_size: usize,
    #[serde(default)]
    pub banned_sectors: Vec<String>,
    /// Optional score floor on the selection scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    /// Restrict the primary cohort to fresh candidates.
    #[serde(default)]
    pub require_fresh: bool,
    /// Restrict the primary cohort to accelerating candidates.
    #[serde(default)]
    pub require_accelerating: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            cohort_size: 10,
            control_size: 5,
            banned_sectors: Vec::new(),
            min_score: None,
            require_fresh: false,
            require_accelerating: false,
        }
    }
}

/// The complete, versioned scan configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Bumped whenever thresholds change, so persisted cohorts can be
    /// traced back to the exact configuration that produced them.
    pub version: String,
    pub holding_period_days: i64,
    pub universe: UniverseConfig,
    pub signals: SignalConfig,
    pub selector: SelectorConfig,
    /// All schemes computed each run. Coexisting eras score side by side.
    pub schemes: Vec<NamedScheme>,
    /// Which scheme's total ranks the primary cohort.
    pub selection: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            version: "v4".into(),
            holding_period_days: 7,
            universe: UniverseConfig::default(),
            signals: SignalConfig::default(),
            selector: SelectorConfig::default(),
            schemes: vec![
                NamedScheme::default_point_based(),
                NamedScheme::default_legacy(),
            ],
            selection: "point_based".into(),
        }
    }
}

impl ScanConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the whole artifact. Any failure is fatal at load time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let u = &self.universe;
        if u.min_market_cap > u.max_market_cap {
            return Err(ConfigError::BadUniverseBound(
                "min_market_cap above max_market_cap".into(),
            ));
        }
        if u.min_price < 0.0 || u.min_dollar_volume < 0.0 {
            return Err(ConfigError::BadUniverseBound(
                "negative price or dollar-volume floor".into(),
            ));
        }

        if self.signals.fresh_min > self.signals.fresh_max {
            return Err(ConfigError::BadFreshBand {
                min: self.signals.fresh_min,
                max: self.signals.fresh_max,
            });
        }

        if self.selector.cohort_size == 0 {
            return Err(ConfigError::BadSelector("cohort_size must be positive".into()));
        }

        let mut seen = std::collections::BTreeSet::new();
        for scheme in &self.schemes {
            if !seen.insert(scheme.id.as_str()) {
                return Err(ConfigError::DuplicateScheme(scheme.id.clone()));
            }
            scheme.validate()?;
        }
        if !seen.contains(self.selection.as_str()) {
            return Err(ConfigError::UnknownSelectionScheme(self.selection.clone()));
        }
        Ok(())
    }

    pub fn scheme(&self, id: &str) -> Option<&NamedScheme> {
        self.schemes.iter().find(|s| s.id == id)
    }

    /// Stable BLAKE3 hash of the canonical JSON form, for run IDs.
    pub fn content_hash(&self) -> String {
        let canonical = serde_json::to_string(self).expect("config serializes");
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }
}
