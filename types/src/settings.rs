//! Resolved configuration types shared across crates.
//!
//! Raw TOML deserialization structs stay private in `adspa-config`. The
//! config loader resolves them into these types at the parse boundary.

use std::time::Duration;

use crate::phase::{Phase, TotalOverride};

/// Phase labels and nominal durations used when no configuration overrides them.
pub const DEFAULT_PHASES: [(&str, u64); 3] = [
    ("Choosing the best spot to insert", 3000),
    ("Detecting the occlusion situation", 3000),
    ("Working on the diffusion process", 4000),
];

/// Label of the precomputed "after" video revealed on completion.
pub const DEFAULT_RESULT_VIDEO: &str = "after.mp4";

#[must_use]
pub fn default_phases() -> Vec<Phase> {
    DEFAULT_PHASES
        .iter()
        .map(|(label, millis)| Phase::new(*label, Duration::from_millis(*millis)))
        .collect()
}

/// Everything a processing run needs besides the user's media selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationSettings {
    pub phases: Vec<Phase>,
    pub total_override: Option<TotalOverride>,
    /// Delay held after logical completion before the run is declared finished.
    pub grace_period: Duration,
    pub result_video: String,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            phases: default_phases(),
            total_override: None,
            grace_period: Duration::ZERO,
            result_video: DEFAULT_RESULT_VIDEO.to_string(),
        }
    }
}

/// Display preferences for the terminal front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
    pub reduced_motion: bool,
}
