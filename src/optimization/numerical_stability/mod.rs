//! numerical_stability — guarded weight arithmetic for the ABC filter.
//!
//! Purpose
//! -------
//! Collect the small numerical helpers that the weighting kernels and the
//! filter engine share: max-shifted log-sum-exp, weight normalization with a
//! uniform fallback, weighted means, and the tolerances used by those checks.
//! Centralizing them keeps every kernel on the same stabilization policy.
//!
//! Key behaviors
//! -------------
//! - Turn log-weights into shifted linear weights while returning the
//!   log of their sum (`log_sum_exp_in_place`).
//! - Normalize weight columns to unit sum, resetting to uniform weights when
//!   every particle was rejected (`normalize_in_place`).
//! - Expose shared constants (`MIN_BANDWIDTH`, `WEIGHT_SUM_TOL`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite or `-inf` log-weights, or finite non-negative weights;
//!   NaNs are rejected upstream by model-contract validation.
//! - After `normalize_in_place` the vector is non-negative and sums to one
//!   within `WEIGHT_SUM_TOL`.
//!
//! Conventions
//! -----------
//! - All routines operate in place on `ndarray` views to avoid allocation in
//!   the per-step loop.
//! - No logging, no I/O, no global state.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] compare the shifted log-sum-exp with
//!   the naïve formula on a safe range, check underflow and all-`-inf`
//!   inputs, and cover the uniform fallback of normalization.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    MIN_BANDWIDTH, WEIGHT_SUM_TOL, log_sum_exp_in_place, normalize_in_place, weighted_mean,
};
