//! Domain types for the screener core.

pub mod cohort;
pub mod flags;
pub mod ids;
pub mod position;
pub mod score;
pub mod snapshot;

pub use cohort::{Cohort, CohortEntry, CohortGroup};
pub use flags::SignalFlags;
pub use ids::RunId;
pub use position::{Position, PositionState};
pub use score::{FactorPoints, ScoreBreakdown};
pub use snapshot::{CandidateSnapshot, CapBucket, RawSnapshot, ValidationError};

/// Ticker type alias
pub type Ticker = String;
