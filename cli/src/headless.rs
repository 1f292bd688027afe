//! Terminal-less run: drives one phase plan on the async harness and
//! reports progress as plain lines.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::Result;

use adspa_engine::{PhasePlan, RunHandle, RunState, narration, spawn_run};

/// Overall progress is reported in steps of this many percent.
const REPORT_STEP_PCT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeadlessOutcome {
    Completed,
    Cancelled,
}

fn phase_line(plan: &PhasePlan, state: &RunState) -> String {
    let name = plan.get(state.active_phase).map_or("", |phase| phase.name());
    format!(
        "[{}/{}] {}: {name}",
        state.active_phase + 1,
        plan.len(),
        narration::stage_title(state.active_phase),
    )
}

fn progress_line(state: &RunState) -> String {
    format!(
        "{:>3.0}%  {}",
        state.overall_progress_pct,
        narration::status_message(state)
    )
}

fn report_bucket(state: &RunState) -> u32 {
    (state.overall_progress_pct / REPORT_STEP_PCT).floor() as u32
}

/// Run `plan` to completion, or until `shutdown` resolves.
pub(crate) async fn run<W, F>(
    plan: PhasePlan,
    grace_period: Duration,
    cadence: Duration,
    out: &mut W,
    shutdown: F,
) -> Result<HeadlessOutcome>
where
    W: Write,
    F: Future<Output = ()>,
{
    tracing::info!(%plan, "Starting headless run");
    let mut handle = spawn_run(plan.clone(), grace_period, cadence);
    let mut states = handle.states();
    tokio::pin!(shutdown);

    let first = *states.borrow_and_update();
    writeln!(out, "{}", phase_line(&plan, &first))?;
    let mut last_phase = first.active_phase;
    let mut last_bucket = report_bucket(&first);

    loop {
        let changed = tokio::select! {
            changed = states.changed() => changed.is_ok(),
            () = &mut shutdown => return cancel(&handle, out),
        };
        if !changed {
            break;
        }

        let state = *states.borrow_and_update();
        if state.active_phase != last_phase {
            last_phase = state.active_phase;
            writeln!(out, "{}", phase_line(&plan, &state))?;
        }
        let bucket = report_bucket(&state);
        if bucket != last_bucket {
            last_bucket = bucket;
            writeln!(out, "{}", progress_line(&state))?;
        }
        if state.completed {
            break;
        }
    }

    let done = tokio::select! {
        done = handle.completed() => Some(done),
        () = &mut shutdown => None,
    };
    let Some(done) = done else {
        return cancel(&handle, out);
    };
    done?;
    writeln!(out, "done")?;
    Ok(HeadlessOutcome::Completed)
}

fn cancel<W: Write>(handle: &RunHandle, out: &mut W) -> Result<HeadlessOutcome> {
    handle.cancel();
    tracing::info!("Headless run cancelled");
    writeln!(out, "cancelled")?;
    Ok(HeadlessOutcome::Cancelled)
}
