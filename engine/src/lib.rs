//! Core engine for ADSPA - run scheduling and application state.
//!
//! This crate contains the state machines without TUI dependencies:
//! [`DriverLoop`] turns a resolved phase plan into a stream of published
//! run snapshots, [`spawn_run`] schedules one on a tokio interval, and
//! [`App`] sequences media selection, processing, and results.

mod app;
mod driver;
mod runtime;

pub use adspa_types::{
    MAX_PLAN_DURATION, Phase, PhaseCursor, PhasePlan, PlanError, ResolvedPhase, RunState,
    SimulationSettings, TotalOverride, UiOptions, narration, resolve_phase_plan, sample,
};
pub use app::{
    App, AppError, AppStatus, HistoryItem, MediaKind, MediaPrompt, MediaSelection,
};
pub use driver::{
    CompletionCallback, DriverError, DriverLoop, LoopStatus, StateObserver, TickOutcome,
};
pub use runtime::{
    DEFAULT_TICK_CADENCE, MIN_TICK_CADENCE, RunCancelled, RunHandle, spawn_run,
};
