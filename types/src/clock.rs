//! Time-to-state mapping for a processing run.
//!
//! [`sample`] is a pure function of the plan and the absolute elapsed time
//! since run start. Hosts recompute from the start timestamp on every tick
//! instead of accumulating per-tick deltas, so irregular tick spacing never
//! causes drift.

use std::time::Duration;

use crate::phase::PhasePlan;

/// Point-in-time snapshot of an in-progress run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunState {
    pub elapsed: Duration,
    /// Index of the active phase. Pinned to the last phase once completed.
    pub active_phase: usize,
    /// Progress of the active phase, `0.0..=100.0`.
    pub phase_progress_pct: f64,
    /// Progress of the whole run, `0.0..=100.0`.
    pub overall_progress_pct: f64,
    pub completed: bool,
}

/// Where a run currently sits in its plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseCursor {
    Active(usize),
    Finished,
}

impl RunState {
    #[must_use]
    pub fn cursor(&self) -> PhaseCursor {
        if self.completed {
            PhaseCursor::Finished
        } else {
            PhaseCursor::Active(self.active_phase)
        }
    }
}

/// Derive the run state for `elapsed` time since start.
#[must_use]
pub fn sample(plan: &PhasePlan, elapsed: Duration) -> RunState {
    let total = plan.total();
    if elapsed >= total {
        return RunState {
            elapsed,
            active_phase: plan.last_index(),
            phase_progress_pct: 100.0,
            overall_progress_pct: 100.0,
            completed: true,
        };
    }

    // Strict `<`: a boundary instant belongs to the phase that starts there.
    let active_phase = plan
        .phases()
        .iter()
        .position(|phase| elapsed < phase.ends_at())
        .unwrap_or_else(|| plan.last_index());

    let phase_progress_pct = plan.get(active_phase).map_or(100.0, |phase| {
        percent(elapsed.saturating_sub(phase.starts_at()), phase.duration())
    });

    RunState {
        elapsed,
        active_phase,
        phase_progress_pct,
        overall_progress_pct: percent(elapsed, total),
        completed: false,
    }
}

fn percent(part: Duration, whole: Duration) -> f64 {
    if whole.is_zero() {
        return 100.0;
    }
    (part.as_secs_f64() / whole.as_secs_f64() * 100.0).clamp(0.0, 100.0)
}
