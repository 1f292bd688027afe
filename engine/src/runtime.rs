//! Async scheduling of a [`DriverLoop`] on a fixed tick cadence.
//!
//! Used by hosts that have no render loop of their own (headless mode).
//! Snapshots are published on a `watch` channel and completion is a
//! `oneshot` that resolves exactly once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use adspa_types::{PhasePlan, RunState, sample};

use crate::driver::{DriverLoop, TickOutcome};

/// ~60 samples per second, matching a typical display refresh.
pub const DEFAULT_TICK_CADENCE: Duration = Duration::from_millis(16);

/// Shortest cadence the scheduler will tick at.
pub const MIN_TICK_CADENCE: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("processing run was cancelled before completion")]
pub struct RunCancelled;

/// Owned scheduling handle for one spawned run.
///
/// Dropping the handle cancels the run.
#[derive(Debug)]
pub struct RunHandle {
    driver: Arc<Mutex<DriverLoop>>,
    states: watch::Receiver<RunState>,
    completion: Option<oneshot::Receiver<()>>,
    task: JoinHandle<()>,
}

/// Spawn a run on the current tokio runtime.
///
/// `cadence` is clamped to at least [`MIN_TICK_CADENCE`].
#[must_use]
pub fn spawn_run(plan: PhasePlan, grace_period: Duration, cadence: Duration) -> RunHandle {
    let (state_tx, states) = watch::channel(sample(&plan, Duration::ZERO));
    let (done_tx, done_rx) = oneshot::channel();

    let mut driver = DriverLoop::with_observer(move |state| {
        state_tx.send_replace(*state);
    });
    let start = Instant::now().into_std();
    // A freshly constructed loop is idle, so start cannot fail here.
    let _ = driver.start_at(
        plan,
        move || {
            let _ = done_tx.send(());
        },
        grace_period,
        start,
    );

    let driver = Arc::new(Mutex::new(driver));
    let task = tokio::spawn(drive(Arc::clone(&driver), cadence.max(MIN_TICK_CADENCE)));

    RunHandle {
        driver,
        states,
        completion: Some(done_rx),
        task,
    }
}

async fn drive(driver: Arc<Mutex<DriverLoop>>, cadence: Duration) {
    let mut ticks = tokio::time::interval(cadence);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticks.tick().await;
        let outcome = lock(&driver).tick_at(Instant::now().into_std());
        match outcome {
            TickOutcome::Progress(_) => {}
            TickOutcome::Finished(_) | TickOutcome::NotRunning => break,
        }
    }
}

fn lock(driver: &Mutex<DriverLoop>) -> MutexGuard<'_, DriverLoop> {
    driver.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RunHandle {
    /// Subscribe to published snapshots.
    #[must_use]
    pub fn states(&self) -> watch::Receiver<RunState> {
        self.states.clone()
    }

    #[must_use]
    pub fn latest(&self) -> RunState {
        *self.states.borrow()
    }

    /// Wait for the completion signal.
    pub async fn completed(&mut self) -> Result<(), RunCancelled> {
        match self.completion.take() {
            Some(rx) => rx.await.map_err(|_| RunCancelled),
            None => Err(RunCancelled),
        }
    }

    /// Stop the run. No snapshot is published after this returns and the
    /// completion signal never fires.
    pub fn cancel(&self) {
        lock(&self.driver).cancel();
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
