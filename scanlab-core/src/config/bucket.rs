//! Bucket tables — interval-to-points mappings with explicit boundaries.
//!
//! Every numeric factor scores through one of these tables. Each bucket
//! names its boundary inclusivity outright ("5–10%" means >=5 and <10 only
//! if the table says so), and the table is validated at load time:
//! overlapping buckets and interior gaps are fatal `ConfigError`s, because a
//! silently mis-bucketed factor would corrupt every candidate's score.
//! Values below the first or above the last bucket take the table default.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// One scoring interval. `min`/`max` of `None` mean unbounded on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default = "default_true")]
    pub min_inclusive: bool,
    #[serde(default)]
    pub max_inclusive: bool,
    pub points: f64,
}

fn default_true() -> bool {
    true
}

impl Bucket {
    pub fn contains(&self, value: f64) -> bool {
        let above_min = match self.min {
            Some(min) => {
                if self.min_inclusive {
                    value >= min
                } else {
                    value > min
                }
            }
            None => true,
        };
        let below_max = match self.max {
            Some(max) => {
                if self.max_inclusive {
                    value <= max
                } else {
                    value < max
                }
            }
            None => true,
        };
        above_min && below_max
    }
}

/// Ordered, non-overlapping buckets plus a default for out-of-range values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketTable {
    pub buckets: Vec<Bucket>,
    #[serde(default)]
    pub default_points: f64,
}

impl BucketTable {
    /// Points for a value: the containing bucket, or the table default.
    pub fn lookup(&self, value: f64) -> f64 {
        self.buckets
            .iter()
            .find(|b| b.contains(value))
            .map(|b| b.points)
            .unwrap_or(self.default_points)
    }

    /// Points for a possibly-missing input: the default bucket, never an error.
    pub fn lookup_opt(&self, value: Option<f64>) -> f64 {
        match value {
            Some(v) => self.lookup(v),
            None => self.default_points,
        }
    }

    /// Validate ordering, non-overlap, and the absence of interior gaps.
    ///
    /// Buckets must be listed in ascending order. Adjacent buckets must meet
    /// exactly: the upper bound of one is the lower bound of the next, with
    /// exactly one side inclusive. Overlap or a gap between declared buckets
    /// is fatal; the open range on either end falls to `default_points`.
    pub fn validate(&self, table_name: &str) -> Result<(), ConfigError> {
        for (i, bucket) in self.buckets.iter().enumerate() {
            if let (Some(min), Some(max)) = (bucket.min, bucket.max) {
                let empty = min > max
                    || (min == max && !(bucket.min_inclusive && bucket.max_inclusive));
                if empty {
                    return Err(ConfigError::EmptyBucket {
                        table: table_name.to_string(),
                        index: i,
                    });
                }
            }
            if !bucket.points.is_finite() {
                return Err(ConfigError::NonFinitePoints {
                    table: table_name.to_string(),
                    index: i,
                });
            }
        }

        for (i, pair) in self.buckets.windows(2).enumerate() {
            let (lo, hi) = (&pair[0], &pair[1]);
            let (lo_max, hi_min) = match (lo.max, hi.min) {
                (Some(a), Some(b)) => (a, b),
                // An interior unbounded side swallows its neighbor.
                _ => {
                    return Err(ConfigError::OverlappingBuckets {
                        table: table_name.to_string(),
                        index: i,
                    })
                }
            };
            if hi_min < lo_max || (hi_min == lo_max && lo.max_inclusive && hi.min_inclusive) {
                return Err(ConfigError::OverlappingBuckets {
                    table: table_name.to_string(),
                    index: i,
                });
            }
            if hi_min > lo_max || (hi_min == lo_max && !lo.max_inclusive && !hi.min_inclusive) {
                return Err(ConfigError::BucketGap {
                    table: table_name.to_string(),
                    index: i,
                });
            }
        }
        Ok(())
    }
}

/// Shorthand for building tables in code (defaults and tests).
pub fn bucket(
    min: Option<f64>,
    min_inclusive: bool,
    max: Option<f64>,
    max_inclusive: bool,
    points: f64,
) -> Bucket {
    Bucket {
        min,
        max,
        min_inclusive,
        max_inclusive,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_interest_table() -> BucketTable {
        // [2,5) -> 20, [5,10) -> 25, [10,15) -> 10
        BucketTable {
            buckets: vec![
                bucket(Some(2.0), true, Some(5.0), false, 20.0),
                bucket(Some(5.0), true, Some(10.0), false, 25.0),
                bucket(Some(10.0), true, Some(15.0), false, 10.0),
            ],
            default_points: 0.0,
        }
    }

    #[test]
    fn lookup_respects_inclusivity() {
        let t = short_interest_table();
        assert_eq!(t.lookup(4.999), 20.0);
        assert_eq!(t.lookup(5.0), 25.0);
        assert_eq!(t.lookup(9.999), 25.0);
        assert_eq!(t.lookup(10.0), 10.0);
        assert_eq!(t.lookup(15.0), 0.0);
        assert_eq!(t.lookup(1.0), 0.0);
    }

    #[test]
    fn missing_input_takes_default() {
        let t = short_interest_table();
        assert_eq!(t.lookup_opt(None), 0.0);
        assert_eq!(t.lookup_opt(Some(7.0)), 25.0);
    }

    #[test]
    fn valid_table_passes() {
        short_interest_table().validate("short_interest").unwrap();
    }

    #[test]
    fn overlap_is_fatal() {
        let t = BucketTable {
            buckets: vec![
                bucket(Some(0.0), true, Some(5.0), true, 1.0),
                bucket(Some(5.0), true, Some(10.0), false, 2.0),
            ],
            default_points: 0.0,
        };
        assert!(matches!(
            t.validate("x"),
            Err(ConfigError::OverlappingBuckets { .. })
        ));
    }

    #[test]
    fn interior_gap_is_fatal() {
        let t = BucketTable {
            buckets: vec![
                bucket(Some(0.0), true, Some(4.0), false, 1.0),
                bucket(Some(5.0), true, Some(10.0), false, 2.0),
            ],
            default_points: 0.0,
        };
        assert!(matches!(t.validate("x"), Err(ConfigError::BucketGap { .. })));
    }

    #[test]
    fn exclusive_exclusive_touch_is_a_gap() {
        // (.., 5) then (5, ..) misses exactly 5.
        let t = BucketTable {
            buckets: vec![
                bucket(None, true, Some(5.0), false, 1.0),
                bucket(Some(5.0), false, None, false, 2.0),
            ],
            default_points: 0.0,
        };
        assert!(matches!(t.validate("x"), Err(ConfigError::BucketGap { .. })));
    }

    #[test]
    fn unbounded_edges_are_fine() {
        let t = BucketTable {
            buckets: vec![
                bucket(None, true, Some(0.0), false, 20.0),
                bucket(Some(0.0), true, Some(2.0), true, 18.0),
                bucket(Some(2.0), false, Some(4.0), true, 12.0),
            ],
            default_points: 0.0,
        };
        t.validate("fresh").unwrap();
        assert_eq!(t.lookup(-3.0), 20.0);
        assert_eq!(t.lookup(2.0), 18.0);
        assert_eq!(t.lookup(4.1), 0.0);
    }

    #[test]
    fn empty_bucket_is_fatal() {
        let t = BucketTable {
            buckets: vec![bucket(Some(5.0), true, Some(2.0), false, 1.0)],
            default_points: 0.0,
        };
        assert!(matches!(t.validate("x"), Err(ConfigError::EmptyBucket { .. })));
    }
}
