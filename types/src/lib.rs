//! Core domain types for ADSPA.
//!
//! This crate contains the phased timing model behind the processing overlay:
//! phase plans, the pure progress clock, and presentation hints derived from
//! run state. No IO, no async, and minimal dependencies.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod clock;
pub mod narration;
mod phase;
mod settings;

pub use clock::{PhaseCursor, RunState, sample};
pub use phase::{
    MAX_PLAN_DURATION, Phase, PhasePlan, PlanError, ResolvedPhase, TotalOverride,
    resolve_phase_plan,
};
pub use settings::{
    DEFAULT_PHASES, DEFAULT_RESULT_VIDEO, SimulationSettings, UiOptions, default_phases,
};
