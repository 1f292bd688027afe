//! Async harness behavior under paused tokio time.

use std::time::Duration;

use adspa_engine::{DEFAULT_TICK_CADENCE, RunCancelled, spawn_run};

use crate::common::{abc_plan, abc_plan_with_total, ms};

#[tokio::test(start_paused = true)]
async fn watch_channel_sees_every_phase() {
    let mut handle = spawn_run(abc_plan(), Duration::ZERO, DEFAULT_TICK_CADENCE);
    let mut rx = handle.states();
    let mut seen = Vec::new();
    loop {
        let state = *rx.borrow_and_update();
        if seen.last() != Some(&state.active_phase) {
            seen.push(state.active_phase);
        }
        if state.completed || rx.changed().await.is_err() {
            break;
        }
    }
    assert_eq!(seen, [0, 1, 2]);
    assert_eq!(handle.completed().await, Ok(()));
}

#[tokio::test(start_paused = true)]
async fn rescaled_run_finishes_at_override_total() {
    let started = tokio::time::Instant::now();
    let mut handle = spawn_run(abc_plan_with_total(2000), Duration::ZERO, DEFAULT_TICK_CADENCE);
    handle.completed().await.unwrap();
    let took = started.elapsed();
    assert!(took >= ms(2000));
    assert!(took < ms(2000) + DEFAULT_TICK_CADENCE * 2);
}

#[tokio::test(start_paused = true)]
async fn slow_cadence_still_completes_once() {
    let mut handle = spawn_run(abc_plan(), Duration::ZERO, ms(3333));
    assert_eq!(handle.completed().await, Ok(()));
    assert!(handle.latest().completed);
    assert_eq!(handle.completed().await, Err(RunCancelled));
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_cancels() {
    let handle = spawn_run(abc_plan(), Duration::ZERO, DEFAULT_TICK_CADENCE);
    let mut rx = handle.states();
    tokio::time::sleep(ms(1000)).await;
    drop(handle);
    let frozen = *rx.borrow_and_update();
    tokio::time::sleep(ms(20_000)).await;
    assert!(!rx.has_changed().unwrap_or(false));
    assert!(!rx.borrow().completed);
    assert_eq!(*rx.borrow(), frozen);
}
