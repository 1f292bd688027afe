//! Plan resolution and sampling properties, checked over fixture tables.

use std::time::Duration;

use adspa_engine::{
    MAX_PLAN_DURATION, Phase, PhaseCursor, PlanError, TotalOverride, resolve_phase_plan, sample,
};

use crate::common::{OVERRIDE_TOTALS_MS, abc_phases, abc_plan, ms, phase_fixtures};

fn nominal_sum_nanos(phases: &[Phase]) -> u128 {
    phases.iter().map(|p| p.nominal().as_nanos()).sum()
}

#[test]
fn durations_sum_exactly_to_total() {
    for phases in phase_fixtures() {
        let plan = resolve_phase_plan(&phases, None).unwrap();
        let sum: Duration = plan.phases().iter().map(|p| p.duration()).sum();
        assert_eq!(sum, plan.total());
        assert_eq!(plan.total().as_nanos(), nominal_sum_nanos(&phases));

        for &total in OVERRIDE_TOTALS_MS {
            let plan = resolve_phase_plan(&phases, TotalOverride::new(ms(total))).unwrap();
            let sum: Duration = plan.phases().iter().map(|p| p.duration()).sum();
            assert_eq!(sum, ms(total), "phases {phases:?} total {total}");
            assert_eq!(plan.total(), ms(total));
        }
    }
}

#[test]
fn every_resolved_duration_is_positive() {
    for phases in phase_fixtures() {
        for &total in OVERRIDE_TOTALS_MS {
            let Some(total) = TotalOverride::new(ms(total)) else {
                continue;
            };
            let plan = resolve_phase_plan(&phases, Some(total)).unwrap();
            assert!(plan.phases().iter().all(|p| p.duration() > Duration::ZERO));
        }
    }
}

#[test]
fn phase_order_and_offsets_are_preserved() {
    let plan = abc_plan();
    let names: Vec<_> = plan.phases().iter().map(|p| p.name()).collect();
    assert_eq!(names, ["A", "B", "C"]);

    let mut expected_start = Duration::ZERO;
    for phase in plan.phases() {
        assert_eq!(phase.starts_at(), expected_start);
        expected_start = phase.ends_at();
    }
    assert_eq!(expected_start, plan.total());
}

#[test]
fn rescaled_durations_are_proportional() {
    for phases in phase_fixtures() {
        let nominal_sum = nominal_sum_nanos(&phases) as f64;
        for &total in OVERRIDE_TOTALS_MS {
            let total = ms(total);
            if total.as_nanos() < phases.len() as u128 {
                continue;
            }
            let plan = resolve_phase_plan(&phases, TotalOverride::new(total)).unwrap();
            for (resolved, phase) in plan.phases().iter().zip(&phases) {
                let expected =
                    phase.nominal().as_nanos() as f64 * (total.as_nanos() as f64 / nominal_sum);
                let actual = resolved.duration().as_nanos() as f64;
                // Integer nanoseconds: within the phase count of the ideal value.
                assert!(
                    (actual - expected).abs() <= phases.len() as f64 + 1.0,
                    "{} expected {expected} got {actual}",
                    resolved.name()
                );
                assert_eq!(resolved.nominal(), phase.nominal());
            }
        }
    }
}

#[test]
fn sampling_is_monotonic() {
    for phases in phase_fixtures() {
        let plan = resolve_phase_plan(&phases, None).unwrap();
        let total = plan.total();
        let steps = 500u32;
        let mut previous = sample(&plan, Duration::ZERO);
        for i in 1..=steps + 20 {
            let elapsed = total.mul_f64(f64::from(i) / f64::from(steps));
            let state = sample(&plan, elapsed);
            assert!(state.overall_progress_pct >= previous.overall_progress_pct);
            assert!(state.active_phase >= previous.active_phase);
            assert!((0.0..=100.0).contains(&state.phase_progress_pct));
            assert!((0.0..=100.0).contains(&state.overall_progress_pct));
            assert!(state.active_phase < plan.len());
            previous = state;
        }
        assert!(previous.completed);
    }
}

#[test]
fn total_duration_completes_the_run() {
    for phases in phase_fixtures() {
        let plan = resolve_phase_plan(&phases, None).unwrap();
        let state = sample(&plan, plan.total());
        assert!(state.completed);
        assert!((state.overall_progress_pct - 100.0).abs() < f64::EPSILON);
        assert!((state.phase_progress_pct - 100.0).abs() < f64::EPSILON);
        assert_eq!(state.active_phase, plan.last_index());
        assert_eq!(state.cursor(), PhaseCursor::Finished);
    }
}

#[test]
fn start_of_run_is_phase_zero_at_zero_percent() {
    for phases in phase_fixtures() {
        let plan = resolve_phase_plan(&phases, None).unwrap();
        let state = sample(&plan, Duration::ZERO);
        assert_eq!(state.active_phase, 0);
        assert_eq!(state.cursor(), PhaseCursor::Active(0));
        assert!(state.overall_progress_pct.abs() < f64::EPSILON);
        assert!(!state.completed);
    }
}

#[test]
fn scenario_nominal_plan_timeline() {
    let plan = abc_plan();
    assert_eq!(plan.total(), ms(10_000));

    let start = sample(&plan, Duration::ZERO);
    assert_eq!(start.active_phase, 0);
    assert!(start.phase_progress_pct.abs() < f64::EPSILON);

    let boundary = sample(&plan, ms(2500));
    assert_eq!(boundary.active_phase, 1);
    assert!(boundary.phase_progress_pct.abs() < f64::EPSILON);

    let mid_b = sample(&plan, ms(4000));
    assert_eq!(mid_b.active_phase, 1);
    assert!((mid_b.phase_progress_pct - 50.0).abs() < 1e-9);

    let end = sample(&plan, ms(10_000));
    assert!(end.completed);
    assert!((end.overall_progress_pct - 100.0).abs() < f64::EPSILON);
}

#[test]
fn scenario_override_rescales_boundaries() {
    let plan = resolve_phase_plan(&abc_phases(), TotalOverride::new(ms(5000))).unwrap();
    let durations: Vec<_> = plan.phases().iter().map(|p| p.duration()).collect();
    assert_eq!(durations, [ms(1250), ms(1500), ms(2250)]);

    let state = sample(&plan, ms(1250));
    assert_eq!(state.active_phase, 1);
    assert!(state.phase_progress_pct.abs() < f64::EPSILON);
}

#[test]
fn scenario_invalid_override_falls_back_to_nominal() {
    for millis in [0.0, -1.0, -5000.0, f64::NAN, f64::INFINITY] {
        let total = TotalOverride::from_millis(millis);
        assert!(total.is_none(), "{millis} should be rejected");
        let plan = resolve_phase_plan(&abc_phases(), total).unwrap();
        assert_eq!(plan.total(), ms(10_000));
        assert!(!plan.is_rescaled());
    }
}

#[test]
fn capped_override_rescales_large_plans_exactly() {
    let phases = vec![
        Phase::from_millis("a", 1e9).unwrap(),
        Phase::from_millis("b", 1e9).unwrap(),
    ];
    let total = TotalOverride::new(MAX_PLAN_DURATION).unwrap();
    let plan = resolve_phase_plan(&phases, Some(total)).unwrap();
    let sum: Duration = plan.phases().iter().map(|p| p.duration()).sum();
    assert_eq!(sum, MAX_PLAN_DURATION);
    assert!(TotalOverride::from_millis(1e17).is_none());
    assert!(Phase::from_millis("a", 1e17).is_err());
}

#[test]
fn scenario_empty_phase_list_is_rejected() {
    assert_eq!(
        resolve_phase_plan(&[], None).unwrap_err(),
        PlanError::EmptyPhaseList
    );
}

#[test]
fn zero_nominal_duration_is_rejected() {
    let mut phases = abc_phases();
    phases[1] = Phase::new("B", Duration::ZERO);
    assert!(matches!(
        resolve_phase_plan(&phases, None),
        Err(PlanError::NonPositiveDuration { index: 1, .. })
    ));
}
