//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use adspa_engine::{DriverLoop, Phase, PhasePlan, RunState, TotalOverride, resolve_phase_plan};

pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// `[("A",2500), ("B",3000), ("C",4500)]`
pub fn abc_phases() -> Vec<Phase> {
    vec![
        Phase::new("A", ms(2500)),
        Phase::new("B", ms(3000)),
        Phase::new("C", ms(4500)),
    ]
}

pub fn abc_plan() -> PhasePlan {
    resolve_phase_plan(&abc_phases(), None).expect("valid phases")
}

pub fn abc_plan_with_total(total_ms: u64) -> PhasePlan {
    resolve_phase_plan(&abc_phases(), TotalOverride::new(ms(total_ms))).expect("valid phases")
}

/// Phase lists with awkward ratios for conservation and proportionality checks.
pub fn phase_fixtures() -> Vec<Vec<Phase>> {
    vec![
        abc_phases(),
        vec![Phase::new("only", ms(1))],
        vec![
            Phase::new("x", ms(1)),
            Phase::new("y", ms(1)),
            Phase::new("z", ms(1)),
        ],
        vec![
            Phase::new("short", ms(7)),
            Phase::new("long", ms(9_999)),
            Phase::new("odd", ms(333)),
        ],
        vec![
            Phase::new("p", Duration::from_nanos(1)),
            Phase::new("q", Duration::from_secs(3600)),
        ],
    ]
}

/// Override totals in milliseconds, including ones that divide unevenly.
pub const OVERRIDE_TOTALS_MS: &[u64] = &[1, 3, 1000, 5000, 9_999, 10_001, 86_400_000];

/// Collects every published state and counts completions.
#[derive(Clone, Default)]
pub struct Recorder {
    states: Arc<Mutex<Vec<RunState>>>,
    completions: Arc<AtomicUsize>,
}

impl Recorder {
    pub fn driver(&self) -> DriverLoop {
        let states = Arc::clone(&self.states);
        DriverLoop::with_observer(move |state| states.lock().unwrap().push(*state))
    }

    pub fn on_complete(&self) -> impl FnOnce() + Send + 'static {
        let completions = Arc::clone(&self.completions);
        move || {
            completions.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn states(&self) -> Vec<RunState> {
        self.states.lock().unwrap().clone()
    }

    pub fn publish_count(&self) -> usize {
        self.states.lock().unwrap().len()
    }

    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}
