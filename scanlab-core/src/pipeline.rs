//! One scheduled run, end to end: validate → filter → detect+score → select.
//!
//! The per-candidate stages are pure and order-independent, so they map in
//! parallel; the selector's sort is the only materialization point. The
//! ledger is touched strictly after the cohort is final — a failed run
//! never leaves a half-applied ledger.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ScanConfig};
use crate::detector::detect;
use crate::domain::{Cohort, RawSnapshot, RunId};
use crate::ledger::PositionLedger;
use crate::rng::ControlRng;
use crate::scoring::score_all;
use crate::selector::{select, ScoredCandidate};
use crate::universe::{filter, Exclusion, ExclusionStage};

/// Everything one run produced: the cohort, the full score table for every
/// quality-passed candidate, and the audit trail of exclusions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub run_date: NaiveDate,
    pub cohort: Cohort,
    /// Every candidate that reached scoring, with all scheme breakdowns.
    pub candidates: Vec<ScoredCandidate>,
    pub exclusions: Vec<Exclusion>,
}

/// Execute one run over already-materialized snapshots.
///
/// A single candidate's bad data never aborts the run: it is excluded with
/// its reason recorded. Only a broken configuration is fatal.
pub fn run_scan(
    raw: Vec<RawSnapshot>,
    config: &ScanConfig,
    run_date: NaiveDate,
    control_rng: ControlRng,
) -> Result<RunReport, ConfigError> {
    config.validate()?;

    let mut exclusions = Vec::new();
    let mut snapshots = Vec::with_capacity(raw.len());
    for row in raw {
        let ticker = row.ticker.clone().unwrap_or_else(|| "<unknown>".into());
        match row.validate() {
            Ok(snap) => snapshots.push(snap),
            Err(e) => exclusions.push(Exclusion::new(
                ticker,
                ExclusionStage::Validation,
                e.to_string(),
            )),
        }
    }

    let (eligible, universe_exclusions) = filter(snapshots, &config.universe);
    exclusions.extend(universe_exclusions);

    let mut candidates: Vec<ScoredCandidate> = eligible
        .into_par_iter()
        .map(|snapshot| {
            let flags = detect(&snapshot, &config.signals);
            let breakdowns = score_all(&snapshot, &flags, &config.schemes);
            ScoredCandidate {
                snapshot,
                flags,
                breakdowns,
            }
        })
        .collect();
    // Parallel collection preserves input order, but sort anyway so the
    // report is canonical regardless of upstream ordering.
    candidates.sort_by(|a, b| a.snapshot.ticker.cmp(&b.snapshot.ticker));

    let seed = control_rng.run_seed(run_date);
    let mut rng = ControlRng::Seeded(seed).rng_for(run_date);
    let (cohort, selector_exclusions) = select(
        &candidates,
        run_date,
        &config.selection,
        &config.selector,
        &mut rng,
    );
    exclusions.extend(selector_exclusions);

    Ok(RunReport {
        run_id: RunId::derive(&config.content_hash(), run_date, seed),
        run_date,
        cohort,
        candidates,
        exclusions,
    })
}

/// What a run changed in the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerDelta {
    /// Tickers newly opened from the primary cohort.
    pub opened: Vec<String>,
    /// Tickers that matured to due-for-exit this run.
    pub newly_due: Vec<String>,
    /// Per-ticker conflicts (already active); the run continues past them.
    pub conflicts: Vec<Exclusion>,
}

/// Apply a computed cohort to the ledger: mature existing positions first,
/// then open the primary entries. Control entries are tracked on paper only
/// and never become positions.
pub fn apply_cohort(
    cohort: &Cohort,
    ledger: &mut PositionLedger,
    holding_period_days: i64,
) -> LedgerDelta {
    let mut delta = LedgerDelta {
        newly_due: ledger.advance(cohort.run_date, holding_period_days),
        ..Default::default()
    };
    for entry in &cohort.primary {
        match ledger.open(&entry.ticker, entry.entry_date, entry.entry_price) {
            Ok(()) => delta.opened.push(entry.ticker.clone()),
            Err(e) => delta.conflicts.push(Exclusion::new(
                &entry.ticker,
                ExclusionStage::Ledger,
                e.to_string(),
            )),
        }
    }
    delta
}
