//! Signal flags derived per candidate per run.

use serde::{Deserialize, Serialize};

/// Boolean signals computed by the detector. Pure function of the snapshot;
/// recomputed every run, never persisted independently of the run's output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalFlags {
    /// Recent return sits inside the "not yet moved" entry band.
    pub is_fresh: bool,
    /// Social-mention volume above threshold on at least one platform.
    pub is_accelerating: bool,
    /// An earnings date or material news event falls inside the window.
    pub catalyst_present: bool,
}
