//! Phase plan data model.
//!
//! A [`PhasePlan`] is the resolved, ordered list of phases for one processing
//! run. Invariants are enforced at construction: every resolved duration is
//! positive and the resolved durations sum exactly to the plan total.
//!
//! Durations are capped at [`MAX_PLAN_DURATION`] so rescaling stays within
//! exact integer arithmetic.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Upper bound for a single phase, the sum of all phases, and a total override.
pub const MAX_PLAN_DURATION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("phase list must not be empty")]
    EmptyPhaseList,
    #[error("phase {index} ({name:?}) must have a positive duration")]
    NonPositiveDuration { index: usize, name: String },
    #[error("phase {name:?} duration {millis} ms is out of range")]
    InvalidMillis { name: String, millis: f64 },
    #[error("phase durations add up to more than {} ms", MAX_PLAN_DURATION.as_millis())]
    PlanTooLong,
    #[error("a {total_nanos} ns override cannot give each of {phases} phases a nanosecond")]
    OverrideTooShort { total_nanos: u128, phases: usize },
}

/// One named stage of the simulated pipeline, as authored.
///
/// The name is opaque to the timing core; it is only carried through for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    name: String,
    nominal: Duration,
}

impl Phase {
    #[must_use]
    pub fn new(name: impl Into<String>, nominal: Duration) -> Self {
        Self {
            name: name.into(),
            nominal,
        }
    }

    /// Build a phase from a millisecond value as found in configuration files.
    pub fn from_millis(name: impl Into<String>, millis: f64) -> Result<Self, PlanError> {
        let name = name.into();
        match millis_to_duration(millis) {
            Some(nominal) => Ok(Self { name, nominal }),
            None => Err(PlanError::InvalidMillis { name, millis }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn nominal(&self) -> Duration {
        self.nominal
    }
}

/// A validated total-duration override.
///
/// Zero, negative, non-finite and over-long values are unrepresentable;
/// callers that hold raw numbers go through [`TotalOverride::from_millis`],
/// which drops invalid values so the plan falls back to nominal durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalOverride(Duration);

impl TotalOverride {
    #[must_use]
    pub fn new(total: Duration) -> Option<Self> {
        (!total.is_zero() && total <= MAX_PLAN_DURATION).then_some(Self(total))
    }

    #[must_use]
    pub fn from_millis(millis: f64) -> Option<Self> {
        millis_to_duration(millis).map(Self)
    }

    #[must_use]
    pub const fn duration(self) -> Duration {
        self.0
    }
}

fn millis_to_duration(millis: f64) -> Option<Duration> {
    if !millis.is_finite() || millis <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(millis / 1000.0)
        .ok()
        .filter(|d| !d.is_zero() && *d <= MAX_PLAN_DURATION)
}

/// A phase together with its effective (possibly rescaled) timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPhase {
    phase: Phase,
    starts_at: Duration,
    duration: Duration,
}

impl ResolvedPhase {
    #[must_use]
    pub fn name(&self) -> &str {
        self.phase.name()
    }

    #[must_use]
    pub const fn nominal(&self) -> Duration {
        self.phase.nominal()
    }

    /// Offset from run start at which this phase becomes active.
    #[must_use]
    pub const fn starts_at(&self) -> Duration {
        self.starts_at
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Offset at which the next phase takes over. Boundaries belong to the
    /// phase that starts at them.
    #[must_use]
    pub fn ends_at(&self) -> Duration {
        self.starts_at.saturating_add(self.duration)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasePlan {
    phases: Vec<ResolvedPhase>,
    total: Duration,
    rescaled: bool,
}

impl PhasePlan {
    #[must_use]
    pub fn phases(&self) -> &[ResolvedPhase] {
        &self.phases
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ResolvedPhase> {
        self.phases.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Always false: an empty plan cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.phases.len().saturating_sub(1)
    }

    #[must_use]
    pub const fn total(&self) -> Duration {
        self.total
    }

    /// Whether a total-duration override was applied.
    #[must_use]
    pub const fn is_rescaled(&self) -> bool {
        self.rescaled
    }
}

impl fmt::Display for PhasePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, phase) in self.phases.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{} ({}ms)", phase.name(), phase.duration.as_millis())?;
        }
        Ok(())
    }
}

/// Resolve the effective phase plan for a run.
///
/// Without an override the nominal durations are used unchanged. With one,
/// every phase is stretched by `total / sum(nominal)`, preserving relative
/// proportions. Every phase keeps at least one nanosecond and the final
/// phase absorbs integer rounding, so the resolved durations always sum to
/// the requested total. An override shorter than one nanosecond per phase is
/// rejected with [`PlanError::OverrideTooShort`].
pub fn resolve_phase_plan(
    phases: &[Phase],
    total_override: Option<TotalOverride>,
) -> Result<PhasePlan, PlanError> {
    if phases.is_empty() {
        return Err(PlanError::EmptyPhaseList);
    }
    if let Some((index, phase)) = phases
        .iter()
        .enumerate()
        .find(|(_, phase)| phase.nominal.is_zero())
    {
        return Err(PlanError::NonPositiveDuration {
            index,
            name: phase.name.clone(),
        });
    }

    let nominal_total = phases
        .iter()
        .try_fold(Duration::ZERO, |acc, phase| acc.checked_add(phase.nominal))
        .filter(|sum| *sum <= MAX_PLAN_DURATION)
        .ok_or(PlanError::PlanTooLong)?;

    let (durations, total) = match total_override {
        Some(total) => {
            let total = total.duration();
            if total.as_nanos() < phases.len() as u128 {
                return Err(PlanError::OverrideTooShort {
                    total_nanos: total.as_nanos(),
                    phases: phases.len(),
                });
            }
            (rescale(phases, nominal_total, total), total)
        }
        None => (phases.iter().map(Phase::nominal).collect(), nominal_total),
    };

    let mut starts_at = Duration::ZERO;
    let resolved = phases
        .iter()
        .zip(durations)
        .map(|(phase, duration)| {
            let resolved = ResolvedPhase {
                phase: phase.clone(),
                starts_at,
                duration,
            };
            starts_at = starts_at.saturating_add(duration);
            resolved
        })
        .collect();

    Ok(PhasePlan {
        phases: resolved,
        total,
        rescaled: total_override.is_some(),
    })
}

/// Callers guarantee `total` holds at least one nanosecond per phase and that
/// both totals are within [`MAX_PLAN_DURATION`], so the products fit in u128.
fn rescale(phases: &[Phase], nominal_total: Duration, total: Duration) -> Vec<Duration> {
    let nominal_nanos = nominal_total.as_nanos().max(1);
    let total_nanos = total.as_nanos();
    // One nanosecond per phase up front; the rest is shared proportionally.
    let spare = total_nanos - phases.len() as u128;

    let mut assigned = 0u128;
    let mut out = Vec::with_capacity(phases.len());
    for phase in &phases[..phases.len() - 1] {
        let nanos = 1 + phase.nominal.as_nanos() * spare / nominal_nanos;
        assigned += nanos;
        out.push(nanos_to_duration(nanos));
    }
    out.push(nanos_to_duration(total_nanos - assigned));
    out
}

fn nanos_to_duration(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
