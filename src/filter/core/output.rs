//! output — the bundle returned by one ABC particle filter run.
//!
//! Purpose
//! -------
//! Hold every per-step array produced by a run together with the cumulative
//! log-likelihood and one sampled trajectory, and reconstruct particle
//! histories from the parent-pointer ancestry.
//!
//! Key behaviors
//! -------------
//! - All `N×T` matrices use rows for particle slots and columns for time.
//! - [`FilterOutput::lineage`] follows parent pointers backwards from a final
//!   slot; [`FilterOutput::trace_trajectory`] maps that lineage to states.
//!
//! Invariants & assumptions
//! ------------------------
//! - `ancestors[(i, t)]` is the slot at `t − 1` that particle `i` at `t`
//!   descends from; column 0 and every non-resampled column are the identity.
//! - Each weight column is non-negative and sums to one.
//! - `ess[t]` is the ESS of weight column `t` and lies in `[1, N]`.
//! - `loglik` equals the sum of `loglik_increments`, possibly `-inf`.
use crate::filter::{
    core::tolerance::ToleranceSchedule,
    errors::{FilterError, FilterResult},
};
use ndarray::{Array1, Array2};

/// FilterOutput — arrays and summaries from one run.
///
/// Fields
/// ------
/// - `particles`: `N×T` particle states.
/// - `weights`: `N×T` normalized weights.
/// - `ancestors`: `N×T` parent slots (identity at `t = 0`).
/// - `proxies`: `N×T` primary observation proxies from the model.
/// - `auxiliary`: the two `N×T` auxiliary arrays returned with the proxies.
/// - `ess`: effective sample size of each weight column.
/// - `resampled`: whether resampling happened at step `t` (always `false` at 0).
/// - `state_estimates`: weighted mean of the particles at each step.
/// - `loglik_increments`: per-step log-likelihood increments.
/// - `bandwidths`: kernel width used at each step.
/// - `loglik`: cumulative log-likelihood.
/// - `tolerances`: the tolerance schedule the run used.
/// - `trajectory_slot`: final-step slot drawn from the final weights.
/// - `trajectory`: states along the lineage of `trajectory_slot`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutput {
    pub particles: Array2<f64>,
    pub weights: Array2<f64>,
    pub ancestors: Array2<usize>,
    pub proxies: Array2<f64>,
    pub auxiliary: [Array2<f64>; 2],
    pub ess: Array1<f64>,
    pub resampled: Vec<bool>,
    pub state_estimates: Array1<f64>,
    pub loglik_increments: Array1<f64>,
    pub bandwidths: Array1<f64>,
    pub loglik: f64,
    pub tolerances: ToleranceSchedule,
    pub trajectory_slot: usize,
    pub trajectory: Array1<f64>,
}

impl FilterOutput {
    pub fn n_particles(&self) -> usize {
        self.particles.nrows()
    }

    pub fn horizon(&self) -> usize {
        self.particles.ncols()
    }

    /// Number of steps at which the ensemble was resampled.
    pub fn resample_count(&self) -> usize {
        self.resampled.iter().filter(|&&r| r).count()
    }

    /// Slot indices along the ancestry of final-step particle `slot`.
    ///
    /// Entry `t` of the result is the slot at time `t` that `slot` descends
    /// from; the last entry is `slot` itself.
    ///
    /// Errors
    /// ------
    /// - `FilterError::SlotOutOfRange` if `slot >= N`.
    pub fn lineage(&self, slot: usize) -> FilterResult<Array1<usize>> {
        let n = self.n_particles();
        if slot >= n {
            return Err(FilterError::SlotOutOfRange { slot, n });
        }
        let horizon = self.horizon();
        let mut path = Array1::zeros(horizon);
        let mut current = slot;
        for t in (0..horizon).rev() {
            path[t] = current;
            current = self.ancestors[(current, t)];
        }
        Ok(path)
    }

    /// States along the ancestry of final-step particle `slot`.
    pub fn trace_trajectory(&self, slot: usize) -> FilterResult<Array1<f64>> {
        let path = self.lineage(slot)?;
        Ok(Array1::from_shape_fn(self.horizon(), |t| self.particles[(path[t], t)]))
    }
}
