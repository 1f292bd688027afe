//! DriverLoop lifecycle scenarios with an explicit clock.

use std::time::{Duration, Instant};

use adspa_engine::{DriverError, LoopStatus, TickOutcome};

use crate::common::{Recorder, abc_plan, abc_plan_with_total, ms};

#[test]
fn completion_fires_exactly_once_under_jittery_ticks() {
    let recorder = Recorder::default();
    let mut driver = recorder.driver();
    let t0 = Instant::now();
    driver
        .start_at(abc_plan(), recorder.on_complete(), Duration::ZERO, t0)
        .unwrap();

    let offsets = [0, 16, 17, 33, 900, 2499, 2500, 2501, 7000, 9999, 10_000, 10_000, 15_000];
    for offset in offsets {
        driver.tick_at(t0 + ms(offset));
    }
    for offset in (10_000..20_000).step_by(7) {
        driver.tick_at(t0 + ms(offset));
    }

    assert_eq!(recorder.completions(), 1);
    assert_eq!(driver.status(), LoopStatus::Finished);
    // Ticks after finishing are not published.
    let published = recorder.publish_count();
    assert_eq!(driver.tick_at(t0 + ms(30_000)), TickOutcome::NotRunning);
    assert_eq!(recorder.publish_count(), published);
}

#[test]
fn published_states_never_move_backwards() {
    let recorder = Recorder::default();
    let mut driver = recorder.driver();
    let t0 = Instant::now();
    driver
        .start_at(abc_plan(), recorder.on_complete(), Duration::ZERO, t0)
        .unwrap();

    for offset in [100, 3000, 2000, 6000, 5999, 8000, 10_000] {
        driver.tick_at(t0 + ms(offset));
    }

    let states = recorder.states();
    for pair in states.windows(2) {
        assert!(pair[1].elapsed >= pair[0].elapsed);
        assert!(pair[1].overall_progress_pct >= pair[0].overall_progress_pct);
        assert!(pair[1].active_phase >= pair[0].active_phase);
    }
    assert!(states.last().is_some_and(|s| s.completed));
}

#[test]
fn second_start_fails_and_first_run_continues() {
    let first = Recorder::default();
    let second = Recorder::default();
    let mut driver = first.driver();
    let t0 = Instant::now();
    driver
        .start_at(abc_plan(), first.on_complete(), Duration::ZERO, t0)
        .unwrap();
    driver.tick_at(t0 + ms(1000));

    let err = driver
        .start_at(
            abc_plan_with_total(100),
            second.on_complete(),
            Duration::ZERO,
            t0 + ms(1500),
        )
        .unwrap_err();
    assert_eq!(err, DriverError::AlreadyRunning);

    // The original plan and start instant are still in effect.
    let TickOutcome::Progress(state) = driver.tick_at(t0 + ms(4000)) else {
        panic!("first run should still be in progress");
    };
    assert_eq!(state.active_phase, 1);
    assert_eq!(driver.plan().map(|p| p.total()), Some(ms(10_000)));

    driver.tick_at(t0 + ms(10_000));
    assert_eq!(first.completions(), 1);
    assert_eq!(second.completions(), 0);
}

#[test]
fn cancel_mid_run_stops_publishing() {
    let recorder = Recorder::default();
    let mut driver = recorder.driver();
    let t0 = Instant::now();
    driver
        .start_at(abc_plan(), recorder.on_complete(), Duration::ZERO, t0)
        .unwrap();
    driver.tick_at(t0 + ms(4000));
    let published = recorder.publish_count();

    driver.cancel();
    driver.cancel();
    for offset in [4016, 8000, 10_000, 60_000] {
        assert_eq!(driver.tick_at(t0 + ms(offset)), TickOutcome::NotRunning);
    }

    assert_eq!(driver.status(), LoopStatus::Idle);
    assert_eq!(recorder.publish_count(), published);
    assert_eq!(recorder.completions(), 0);
}

#[test]
fn grace_period_counts_from_first_completed_tick() {
    let recorder = Recorder::default();
    let mut driver = recorder.driver();
    let t0 = Instant::now();
    driver
        .start_at(abc_plan(), recorder.on_complete(), ms(500), t0)
        .unwrap();

    // First observation of completion arrives late.
    driver.tick_at(t0 + ms(12_000));
    assert_eq!(recorder.completions(), 0);
    driver.tick_at(t0 + ms(12_499));
    assert_eq!(recorder.completions(), 0);
    assert!(matches!(
        driver.tick_at(t0 + ms(12_500)),
        TickOutcome::Finished(_)
    ));
    assert_eq!(recorder.completions(), 1);
}

#[test]
fn independent_drivers_do_not_interfere() {
    let a = Recorder::default();
    let b = Recorder::default();
    let mut driver_a = a.driver();
    let mut driver_b = b.driver();
    let t0 = Instant::now();
    driver_a
        .start_at(abc_plan(), a.on_complete(), Duration::ZERO, t0)
        .unwrap();
    driver_b
        .start_at(abc_plan_with_total(5000), b.on_complete(), Duration::ZERO, t0 + ms(1000))
        .unwrap();

    driver_a.tick_at(t0 + ms(6000));
    driver_b.tick_at(t0 + ms(6000));
    assert_eq!(a.completions(), 0);
    assert_eq!(b.completions(), 1);

    driver_a.cancel();
    assert_eq!(driver_b.status(), LoopStatus::Finished);
}
