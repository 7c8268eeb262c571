//! Scorer — one pure function, parameterized by scheme configuration.
//!
//! Any number of schemes score the same snapshot+flags without touching
//! shared state, so coexisting eras (legacy composite, point-based) are
//! computed side by side every run and their breakdowns compared.
//!
//! The breakdown-sum invariant holds for every scheme: the total is the
//! exact sum of the recorded entries, with the legacy clamp's correction
//! recorded as its own entry rather than silently absorbed.

use crate::config::{CompositeScheme, NamedScheme, PointScheme, Scheme};
use crate::domain::{CandidateSnapshot, ScoreBreakdown, SignalFlags};

/// Score one candidate under one scheme.
pub fn score(snap: &CandidateSnapshot, flags: &SignalFlags, scheme: &NamedScheme) -> ScoreBreakdown {
    match &scheme.scheme {
        Scheme::PointBased(p) => score_point_based(snap, &scheme.id, p),
        Scheme::Composite(c) => score_composite(snap, flags, &scheme.id, c),
    }
}

/// Score one candidate under every scheme in order.
pub fn score_all(
    snap: &CandidateSnapshot,
    flags: &SignalFlags,
    schemes: &[NamedScheme],
) -> Vec<ScoreBreakdown> {
    schemes.iter().map(|s| score(snap, flags, s)).collect()
}

fn score_point_based(snap: &CandidateSnapshot, id: &str, scheme: &PointScheme) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::new(id);
    let cap = snap.cap_bucket();
    breakdown.push("sector", scheme.sector.lookup(&snap.sector, cap));
    breakdown.push("market_cap", scheme.market_cap.lookup(cap));
    for factor in &scheme.factors {
        breakdown.push(&factor.name, factor.table.lookup_opt(factor.input.extract(snap)));
    }
    breakdown
}

fn score_composite(
    snap: &CandidateSnapshot,
    flags: &SignalFlags,
    id: &str,
    scheme: &CompositeScheme,
) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::new(id);
    for factor in &scheme.factors {
        let sub_score = factor.table.lookup_opt(factor.input.extract(snap));
        breakdown.push(&factor.name, factor.weight * sub_score);
    }
    for boost in &scheme.boosts {
        if boost.trigger.fires(snap, flags) {
            breakdown.push(&boost.name, boost.delta);
        }
    }
    let clamped = breakdown.total.clamp(scheme.clamp_min, scheme.clamp_max);
    if clamped != breakdown.total {
        breakdown.push("clamp", clamped - breakdown.total);
    }
    breakdown
}
