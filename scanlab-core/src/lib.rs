//! ScanLab Core — daily equity screening pipeline and position lifecycle.
//!
//! This crate contains the deterministic core of the screener:
//! - Domain types (snapshots, signal flags, score breakdowns, cohorts, positions)
//! - Universe filter with audited exclusions
//! - Signal detector (fresh / accelerating / catalyst)
//! - Scorer: coexisting point-based and legacy composite schemes, both
//!   table-driven and validated at load time
//! - Selector with deterministic ranking and a seeded control-cohort draw
//! - Position ledger state machine (Open → DueForExit → Closed)
//!
//! All I/O — market data, social mentions, notification, order placement —
//! lives with external collaborators. The core consumes already-materialized
//! snapshots and emits a `RunReport` plus ledger deltas.

pub mod config;
pub mod detector;
pub mod domain;
pub mod ledger;
pub mod pipeline;
pub mod rng;
pub mod scoring;
pub mod selector;
pub mod universe;
