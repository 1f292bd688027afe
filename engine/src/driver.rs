//! Scheduling harness for one processing run.
//!
//! `DriverLoop` owns the run state machine:
//!
//! ```text
//! Idle --start--> Running --(completed + grace)--> Finished
//!   ^                |                                |
//!   +----cancel------+-------------cancel-------------+
//! ```
//!
//! The host calls [`DriverLoop::tick_at`] on its render cadence. Every tick
//! resamples the pure clock from the stored start instant, publishes the
//! snapshot to the observer, and fires the completion callback exactly once
//! after the grace period has elapsed.

use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;

use adspa_types::{PhasePlan, RunState, sample};

/// Fire-once completion notification.
pub type CompletionCallback = Box<dyn FnOnce() + Send>;

/// Receives every published run snapshot.
pub type StateObserver = Box<dyn FnMut(&RunState) + Send>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("a processing run is already in progress")]
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    Idle,
    Running,
    Finished,
}

/// Result of one scheduling tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// No run is active; nothing was published.
    NotRunning,
    /// State published; keep ticking.
    Progress(RunState),
    /// State published and the completion callback fired on this tick.
    Finished(RunState),
}

struct ActiveRun {
    plan: PhasePlan,
    started_at: Instant,
    grace_period: Duration,
    on_complete: Option<CompletionCallback>,
    /// First tick instant that observed logical completion.
    completion_seen_at: Option<Instant>,
    last: Option<RunState>,
}

impl fmt::Debug for ActiveRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveRun")
            .field("plan", &self.plan)
            .field("started_at", &self.started_at)
            .field("grace_period", &self.grace_period)
            .field("on_complete", &self.on_complete.as_ref().map(|_| "FnOnce"))
            .field("completion_seen_at", &self.completion_seen_at)
            .field("last", &self.last)
            .finish()
    }
}

#[derive(Debug, Default)]
enum LoopState {
    #[default]
    Idle,
    Running(Box<ActiveRun>),
    Finished { plan: PhasePlan, last: RunState },
}

#[derive(Default)]
pub struct DriverLoop {
    state: LoopState,
    observer: Option<StateObserver>,
}

impl fmt::Debug for DriverLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverLoop")
            .field("state", &self.state)
            .field("observer", &self.observer.as_ref().map(|_| "FnMut"))
            .finish()
    }
}

impl DriverLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_observer(observer: impl FnMut(&RunState) + Send + 'static) -> Self {
        Self {
            state: LoopState::Idle,
            observer: Some(Box::new(observer)),
        }
    }

    #[must_use]
    pub fn status(&self) -> LoopStatus {
        match self.state {
            LoopState::Idle => LoopStatus::Idle,
            LoopState::Running(_) => LoopStatus::Running,
            LoopState::Finished { .. } => LoopStatus::Finished,
        }
    }

    /// Whether the host should keep scheduling ticks.
    #[must_use]
    pub fn wants_tick(&self) -> bool {
        matches!(self.state, LoopState::Running(_))
    }

    /// Most recently published snapshot of the current or just-finished run.
    #[must_use]
    pub fn last_state(&self) -> Option<RunState> {
        match &self.state {
            LoopState::Idle => None,
            LoopState::Running(run) => run.last,
            LoopState::Finished { last, .. } => Some(*last),
        }
    }

    #[must_use]
    pub fn plan(&self) -> Option<&PhasePlan> {
        match &self.state {
            LoopState::Idle => None,
            LoopState::Running(run) => Some(&run.plan),
            LoopState::Finished { plan, .. } => Some(plan),
        }
    }

    pub fn start(
        &mut self,
        plan: PhasePlan,
        on_complete: impl FnOnce() + Send + 'static,
        grace_period: Duration,
    ) -> Result<(), DriverError> {
        self.start_at(plan, on_complete, grace_period, Instant::now())
    }

    /// Begin a run whose clock starts at `now`.
    ///
    /// Fails without disturbing the current run if one is already in progress.
    /// Starting from `Finished` begins a fresh run.
    pub fn start_at(
        &mut self,
        plan: PhasePlan,
        on_complete: impl FnOnce() + Send + 'static,
        grace_period: Duration,
        now: Instant,
    ) -> Result<(), DriverError> {
        if self.wants_tick() {
            return Err(DriverError::AlreadyRunning);
        }

        tracing::info!(
            phases = plan.len(),
            total_ms = plan.total().as_millis() as u64,
            grace_ms = grace_period.as_millis() as u64,
            rescaled = plan.is_rescaled(),
            "Processing run started"
        );

        self.state = LoopState::Running(Box::new(ActiveRun {
            plan,
            started_at: now,
            grace_period,
            on_complete: Some(Box::new(on_complete)),
            completion_seen_at: None,
            last: None,
        }));
        Ok(())
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.tick_at(Instant::now())
    }

    /// Sample the run at `now` and publish the result.
    ///
    /// Elapsed time is always measured from the start instant, so arbitrarily
    /// large gaps between ticks are harmless. A `now` earlier than a previous
    /// tick republishes the previous snapshot rather than moving backwards.
    pub fn tick_at(&mut self, now: Instant) -> TickOutcome {
        let Self { state, observer } = self;
        let LoopState::Running(run) = state else {
            return TickOutcome::NotRunning;
        };

        let elapsed = now.saturating_duration_since(run.started_at);
        let mut snapshot = sample(&run.plan, elapsed);
        if let Some(last) = run.last {
            if snapshot.elapsed < last.elapsed {
                snapshot = last;
            } else if snapshot.active_phase != last.active_phase {
                tracing::debug!(
                    from = last.active_phase,
                    to = snapshot.active_phase,
                    phase = run.plan.get(snapshot.active_phase).map(|p| p.name()),
                    "Phase transition"
                );
            }
        }
        run.last = Some(snapshot);

        if let Some(observer) = observer.as_mut() {
            observer(&snapshot);
        }

        if !snapshot.completed {
            return TickOutcome::Progress(snapshot);
        }

        let seen_at = *run.completion_seen_at.get_or_insert(now);
        if now.saturating_duration_since(seen_at) < run.grace_period {
            return TickOutcome::Progress(snapshot);
        }

        let previous = std::mem::replace(state, LoopState::Idle);
        let LoopState::Running(run) = previous else {
            return TickOutcome::NotRunning;
        };
        let ActiveRun {
            plan, on_complete, ..
        } = *run;
        *state = LoopState::Finished {
            plan,
            last: snapshot,
        };

        tracing::info!(
            elapsed_ms = snapshot.elapsed.as_millis() as u64,
            "Processing run finished"
        );
        if let Some(on_complete) = on_complete {
            on_complete();
        }
        TickOutcome::Finished(snapshot)
    }

    /// Abandon the current run without firing its completion callback.
    ///
    /// Safe from any state and idempotent.
    pub fn cancel(&mut self) {
        if let LoopState::Running(run) = &self.state {
            tracing::info!(
                elapsed_ms = run.last.map_or(0, |s| s.elapsed.as_millis() as u64),
                "Processing run cancelled"
            );
        }
        self.state = LoopState::Idle;
    }
}
