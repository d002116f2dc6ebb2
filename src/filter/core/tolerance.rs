//! Tolerance schedules for ABC kernels — one validated width per time step.
//!
//! Purpose
//! -------
//! Provide the per-step tolerance `ε_t` consumed by the ABC weighting kernels,
//! together with the policy that produces it from run configuration. A single
//! scalar is the common case; it is broadcast to every step so that the engine
//! always indexes a schedule and time-varying tolerances need no engine change.
//!
//! Key behaviors
//! -------------
//! - [`TolerancePolicy`] records *intent*: a constant scalar or an explicit
//!   per-step schedule.
//! - [`ToleranceSchedule`] is the validated, horizon-length realization used
//!   during a run and kept in the output bundle.
//! - Invalid widths are rejected with `FilterError::InvalidTolerance` carrying
//!   the offending step.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every entry of a constructed [`ToleranceSchedule`] is finite and > 0.
//! - A schedule is never empty.
//! - An explicit schedule must match the run horizon exactly; it is never
//!   truncated or padded.
//!
//! Conventions
//! -----------
//! - For the boxcar kernel `ε_t` is the acceptance half-width; for the
//!   Gaussian kernel it is the standard deviation. The quasi-Cauchy kernel
//!   estimates its own bandwidth and ignores `ε_t`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover broadcasting, explicit schedules, and each error path.
use crate::filter::{
    core::validation::{validate_horizon, validate_tolerance},
    errors::{FilterError, FilterResult},
};
use ndarray::{Array1, ArrayView1};

/// ToleranceSchedule — validated ABC tolerance per time step.
///
/// Fields
/// ------
/// - `values`: `Array1<f64>`
///   One tolerance per step, all finite and strictly positive.
///
/// Invariants
/// ----------
/// - `values.len() >= 1` and every entry satisfies `0 < ε_t < ∞`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceSchedule {
    values: Array1<f64>,
}

impl ToleranceSchedule {
    /// Broadcast a scalar tolerance to `horizon` steps.
    ///
    /// Errors
    /// ------
    /// - `FilterError::InvalidHorizon` if `horizon == 0`.
    /// - `FilterError::InvalidTolerance` if `tolerance` is not finite or `<= 0`.
    pub fn constant(tolerance: f64, horizon: usize) -> FilterResult<Self> {
        let horizon = validate_horizon(horizon)?;
        let tolerance = validate_tolerance(0, tolerance)?;
        Ok(ToleranceSchedule { values: Array1::from_elem(horizon, tolerance) })
    }

    /// Build a schedule from explicit per-step values.
    ///
    /// Errors
    /// ------
    /// - `FilterError::EmptyToleranceSchedule` if `values` is empty.
    /// - `FilterError::InvalidTolerance { index, .. }` for the first invalid entry.
    pub fn from_values(values: Array1<f64>) -> FilterResult<Self> {
        if values.is_empty() {
            return Err(FilterError::EmptyToleranceSchedule);
        }
        for (index, &value) in values.iter().enumerate() {
            validate_tolerance(index, value)?;
        }
        Ok(ToleranceSchedule { values })
    }

    /// Tolerance at step `t`.
    ///
    /// Panics if `t >= self.len()`; the engine only indexes inside the horizon
    /// it checked the schedule against.
    pub fn at(&self, t: usize) -> f64 {
        self.values[t]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }
}

/// TolerancePolicy — how the per-step schedule is derived for a run.
///
/// Variants
/// --------
/// - `Constant(ε)`
///   Broadcast `ε` to every step of the run horizon.
/// - `Schedule(s)`
///   Use an explicit schedule; its length must equal the run horizon.
#[derive(Debug, Clone, PartialEq)]
pub enum TolerancePolicy {
    Constant(f64),
    Schedule(ToleranceSchedule),
}

impl TolerancePolicy {
    /// Validated constant policy.
    pub fn constant(tolerance: f64) -> FilterResult<Self> {
        Ok(TolerancePolicy::Constant(validate_tolerance(0, tolerance)?))
    }

    /// Realize the schedule for a run of `horizon` steps.
    ///
    /// Errors
    /// ------
    /// - Propagates [`ToleranceSchedule::constant`] errors for `Constant`.
    /// - `FilterError::ToleranceScheduleLength` when an explicit schedule does
    ///   not match `horizon`.
    pub fn schedule(&self, horizon: usize) -> FilterResult<ToleranceSchedule> {
        match self {
            TolerancePolicy::Constant(tolerance) => ToleranceSchedule::constant(*tolerance, horizon),
            TolerancePolicy::Schedule(schedule) => {
                if schedule.len() != horizon {
                    return Err(FilterError::ToleranceScheduleLength {
                        expected: horizon,
                        actual: schedule.len(),
                    });
                }
                Ok(schedule.clone())
            }
        }
    }
}
