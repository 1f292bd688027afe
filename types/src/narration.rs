//! Presentation hints derived from a [`RunState`].
//!
//! The processing overlay fabricates its "analysis" entirely from progress
//! thresholds. Everything here is a pure function of the published state so
//! any front end renders the same story.

use crate::clock::RunState;

/// Diffusion step count shown during the synthesis stage.
pub const DIFFUSION_STEPS: u32 = 50;

/// Layers that fade into the visualization window as a stage progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    AssetLoaded,
    BoundingBox,
    DepthMap,
    OcclusionResolved,
}

impl Reveal {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Reveal::AssetLoaded => "ASSET LOADED",
            Reveal::BoundingBox => "OPTIMAL REGION  CONF: 98%",
            Reveal::DepthMap => "SAM SEGMENTATION",
            Reveal::OcclusionResolved => "OCCLUSION RESOLVED",
        }
    }
}

/// Status of one step in the phase timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    Active,
    Pending,
}

#[must_use]
pub fn stage_title(phase_index: usize) -> &'static str {
    match phase_index {
        0 => "SPATIAL ANALYSIS",
        1 => "OCCLUSION LOGIC",
        2 => "DIFFUSION SYNTHESIS",
        _ => "PROCESSING",
    }
}

#[must_use]
pub fn stage_short_label(phase_index: usize) -> &'static str {
    match phase_index {
        0 => "Spatial",
        1 => "Occlusion",
        2 => "Diffusion",
        _ => "Processing",
    }
}

/// One-line terminal log message for the current instant.
#[must_use]
pub fn status_message(state: &RunState) -> &'static str {
    let progress = state.phase_progress_pct;
    match state.active_phase {
        0 if progress < 30.0 => "Scanning geometry...",
        0 if progress < 60.0 => "Detecting planar surfaces...",
        0 => "Calculating optimal insertion coordinates...",
        1 if progress < 33.0 => "Analyzing scene composition...",
        1 if progress < 66.0 => "Generating SAM depth segmentation...",
        1 => "Compositing occlusion layers...",
        2 => "Running stable diffusion synthesis...",
        _ => "Processing...",
    }
}

/// Layers visible for the active stage, in stacking order.
#[must_use]
pub fn reveals(state: &RunState) -> &'static [Reveal] {
    let progress = state.phase_progress_pct;
    match state.active_phase {
        0 if progress > 60.0 => &[Reveal::AssetLoaded, Reveal::BoundingBox],
        0 if progress > 30.0 => &[Reveal::AssetLoaded],
        1 if progress > 66.0 => &[Reveal::DepthMap, Reveal::OcclusionResolved],
        1 if progress > 33.0 => &[Reveal::DepthMap],
        _ => &[],
    }
}

/// Completed diffusion steps out of [`DIFFUSION_STEPS`].
#[must_use]
pub fn diffusion_step(state: &RunState) -> u32 {
    ((state.phase_progress_pct / 2.0).floor() as u32).min(DIFFUSION_STEPS)
}

#[must_use]
pub fn step_status(state: &RunState, step: usize) -> StepStatus {
    if state.completed || step < state.active_phase {
        StepStatus::Done
    } else if step == state.active_phase {
        StepStatus::Active
    } else {
        StepStatus::Pending
    }
}

/// Fraction of the timeline connector that is filled, `0.0..=1.0`.
#[must_use]
pub fn timeline_fraction(state: &RunState, phase_count: usize) -> f64 {
    if phase_count <= 1 {
        return 1.0;
    }
    (state.active_phase as f64 / (phase_count - 1) as f64).clamp(0.0, 1.0)
}
