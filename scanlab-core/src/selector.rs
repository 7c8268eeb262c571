//! Selector — ranks scored candidates into the primary cohort and draws the
//! same-universe control cohort.
//!
//! Ranking is fully deterministic: descending total under the selection
//! scheme, ties broken by ticker lexical order. Randomness enters only
//! through the injected control RNG, so varying the seed moves the control
//! cohort and never the primary one.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};

use crate::config::SelectorConfig;
use crate::domain::{CandidateSnapshot, Cohort, CohortEntry, CohortGroup, ScoreBreakdown, SignalFlags};
use crate::universe::{Exclusion, ExclusionStage};

/// One candidate after detection and scoring, ready for selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub snapshot: CandidateSnapshot,
    pub flags: SignalFlags,
    /// One breakdown per configured scheme, in scheme order.
    pub breakdowns: Vec<ScoreBreakdown>,
}

impl ScoredCandidate {
    pub fn total_for(&self, scheme_id: &str) -> Option<f64> {
        self.breakdowns
            .iter()
            .find(|b| b.scheme == scheme_id)
            .map(|b| b.total)
    }
}

fn entry(candidate: &ScoredCandidate, group: CohortGroup, run_date: NaiveDate) -> CohortEntry {
    CohortEntry {
        ticker: candidate.snapshot.ticker.clone(),
        group,
        entry_date: run_date,
        entry_price: candidate.snapshot.price,
        breakdowns: candidate.breakdowns.clone(),
    }
}

/// Rank, gate, and draw. Returns the cohort plus selector-stage exclusions.
///
/// A smaller-than-N (or empty) cohort is a valid output on quiet days; the
/// control draw excludes primary tickers, so the two are disjoint by
/// construction.
pub fn select(
    candidates: &[ScoredCandidate],
    run_date: NaiveDate,
    selection_scheme: &str,
    config: &SelectorConfig,
    rng: &mut StdRng,
) -> (Cohort, Vec<Exclusion>) {
    let mut exclusions = Vec::new();

    // Banned sectors leave the run entirely: neither cohort may hold them.
    let mut pool: Vec<&ScoredCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if config.banned_sectors.contains(&candidate.snapshot.sector) {
            exclusions.push(Exclusion::new(
                &candidate.snapshot.ticker,
                ExclusionStage::Selector,
                format!("banned sector: {}", candidate.snapshot.sector),
            ));
        } else {
            pool.push(candidate);
        }
    }

    // Optional gates apply to the primary ranking only; gated-out names
    // stay in the control pool (same eligibility, no signal filtering).
    let mut ranked: Vec<&ScoredCandidate> = pool
        .iter()
        .copied()
        .filter(|c| {
            if config.require_fresh && !c.flags.is_fresh {
                return false;
            }
            if config.require_accelerating && !c.flags.is_accelerating {
                return false;
            }
            match (config.min_score, c.total_for(selection_scheme)) {
                (Some(floor), Some(total)) => total >= floor,
                (Some(_), None) => false,
                (None, _) => true,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        let score_a = a.total_for(selection_scheme).unwrap_or(f64::NEG_INFINITY);
        let score_b = b.total_for(selection_scheme).unwrap_or(f64::NEG_INFINITY);
        score_b
            .partial_cmp(&score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.snapshot.ticker.cmp(&b.snapshot.ticker))
    });

    let primary: Vec<CohortEntry> = ranked
        .iter()
        .take(config.cohort_size)
        .map(|c| entry(c, CohortGroup::Primary, run_date))
        .collect();

    // Control draw: uniform without replacement from the eligible pool
    // minus the primary cohort, ordered by ticker so the draw depends only
    // on the seed, never on input order.
    let mut control_pool: Vec<&ScoredCandidate> = pool
        .iter()
        .copied()
        .filter(|c| !primary.iter().any(|p| p.ticker == c.snapshot.ticker))
        .collect();
    control_pool.sort_by(|a, b| a.snapshot.ticker.cmp(&b.snapshot.ticker));

    let draw = config.control_size.min(control_pool.len());
    let mut indices: Vec<usize> = sample(rng, control_pool.len(), draw).into_vec();
    indices.sort_unstable();
    let control: Vec<CohortEntry> = indices
        .into_iter()
        .map(|i| entry(control_pool[i], CohortGroup::Control, run_date))
        .collect();

    (
        Cohort {
            run_date,
            primary,
            control,
        },
        exclusions,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn candidate(ticker: &str, sector: &str, total: f64) -> ScoredCandidate {
        let mut breakdown = ScoreBreakdown::new("point_based");
        breakdown.push("all", total);
        ScoredCandidate {
            snapshot: CandidateSnapshot {
                ticker: ticker.into(),
                price: 20.0,
                market_cap: 3e9,
                sector: sector.into(),
                short_interest_pct: None,
                return_1d_pct: None,
                return_7d_pct: 1.0,
                return_90d_pct: 5.0,
                dist_52w_high_pct: None,
                twitter_mentions_24h: 0,
                reddit_mentions: 0,
                volume: 1_000_000,
                avg_volume: 1_000_000,
                earnings_days_until: None,
                news_event_days_ago: None,
                fundamental_quality: None,
            },
            flags: SignalFlags::default(),
            breakdowns: vec![breakdown],
        }
    }

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 11).unwrap()
    }

    fn config(n: usize, m: usize) -> SelectorConfig {
        SelectorConfig {
            cohort_size: n,
            control_size: m,
            ..Default::default()
        }
    }

    #[test]
    fn ranks_descending_with_lexical_tie_break() {
        let candidates = vec![
            candidate("BBB", "Technology", 50.0),
            candidate("AAA", "Technology", 50.0),
            candidate("CCC", "Technology", 80.0),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let (cohort, _) = select(&candidates, run_date(), "point_based", &config(3, 0), &mut rng);
        let tickers: Vec<_> = cohort.primary_tickers().collect();
        assert_eq!(tickers, vec!["CCC", "AAA", "BBB"]);
    }

    #[test]
    fn banned_sector_never_selected_in_either_cohort() {
        let candidates = vec![
            candidate("AAA", "Biotechnology", 90.0),
            candidate("BBB", "Technology", 50.0),
            candidate("CCC", "Technology", 40.0),
        ];
        let cfg = SelectorConfig {
            cohort_size: 1,
            control_size: 2,
            banned_sectors: vec!["Biotechnology".into()],
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let (cohort, exclusions) = select(&candidates, run_date(), "point_based", &cfg, &mut rng);
        assert!(cohort.primary_tickers().all(|t| t != "AAA"));
        assert!(cohort.control_tickers().all(|t| t != "AAA"));
        assert_eq!(exclusions.len(), 1);
        assert_eq!(exclusions[0].ticker, "AAA");
    }

    #[test]
    fn twelve_eligible_top_ten_leaves_two_for_control() {
        let candidates: Vec<_> = (0..12)
            .map(|i| candidate(&format!("T{i:02}"), "Technology", 100.0 - i as f64))
            .collect();
        let mut rng = StdRng::seed_from_u64(3);
        let (cohort, _) = select(&candidates, run_date(), "point_based", &config(10, 5), &mut rng);
        assert_eq!(cohort.primary.len(), 10);
        // Only two non-selected names remain for the control draw.
        assert_eq!(cohort.control.len(), 2);
        assert!(cohort.is_disjoint());
    }

    #[test]
    fn seed_changes_only_the_control_cohort() {
        let candidates: Vec<_> = (0..30)
            .map(|i| candidate(&format!("T{i:02}"), "Technology", 100.0 - i as f64))
            .collect();
        let select_with = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            select(&candidates, run_date(), "point_based", &config(10, 5), &mut rng).0
        };
        let a = select_with(1);
        let b = select_with(2);
        let a_primary: Vec<_> = a.primary_tickers().collect();
        let b_primary: Vec<_> = b.primary_tickers().collect();
        assert_eq!(a_primary, b_primary);

        let same_seed = select_with(1);
        let a_control: Vec<_> = a.control_tickers().collect();
        let again: Vec<_> = same_seed.control_tickers().collect();
        assert_eq!(a_control, again);
    }

    #[test]
    fn empty_input_yields_empty_cohort() {
        let mut rng = StdRng::seed_from_u64(9);
        let (cohort, exclusions) = select(&[], run_date(), "point_based", &config(10, 5), &mut rng);
        assert!(cohort.is_empty());
        assert!(exclusions.is_empty());
    }

    #[test]
    fn gated_out_names_remain_in_control_pool() {
        let mut hot = candidate("HOT", "Technology", 90.0);
        hot.flags.is_fresh = true;
        let cold = candidate("COLD", "Technology", 80.0);
        let cfg = SelectorConfig {
            cohort_size: 5,
            control_size: 5,
            require_fresh: true,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let (cohort, _) = select(&[hot, cold], run_date(), "point_based", &cfg, &mut rng);
        let primary: Vec<_> = cohort.primary_tickers().collect();
        assert_eq!(primary, vec!["HOT"]);
        let control: Vec<_> = cohort.control_tickers().collect();
        assert_eq!(control, vec!["COLD"]);
    }

    #[test]
    fn entries_are_stamped_with_run_date_and_price() {
        let candidates = vec![candidate("AAA", "Technology", 10.0)];
        let mut rng = StdRng::seed_from_u64(5);
        let (cohort, _) = select(&candidates, run_date(), "point_based", &config(1, 0), &mut rng);
        assert_eq!(cohort.primary[0].entry_date, run_date());
        assert_eq!(cohort.primary[0].entry_price, 20.0);
    }
}
