//! optimization — likelihood objective and numerical helpers.
//!
//! Purpose
//! -------
//! Provide the pieces that sit between the ABC filter and an outer parameter
//! search: a θ → log-likelihood objective with common random numbers, and the
//! guarded weight arithmetic shared by the kernels and the engine.
//!
//! Key behaviors
//! -------------
//! - [`objective`]: the [`LogLikelihoodEstimator`] trait and its ABC
//!   implementation [`AbcObjective`]. Search algorithms themselves live
//!   outside this crate.
//! - [`numerical_stability`]: max-shifted log-sum-exp, normalization with a
//!   uniform fallback, weighted means, and related constants.
//!
//! Conventions
//! -----------
//! - The objective is expressed as a log-likelihood to be maximized; it may
//!   be `-inf` when every particle is rejected at some step.
//! - Errors are reported as `FilterResult`, shared with the filter layer.
//!
//! Testing notes
//! -------------
//! - `numerical_stability` is tested against naïve formulas on safe ranges
//!   and on underflow inputs; `objective` is tested for common random
//!   numbers, error propagation, and noisy-ABC perturbation.

pub mod numerical_stability;
pub mod objective;

pub use self::objective::{AbcObjective, LogLikelihoodEstimator, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use abc_smc::optimization::prelude::*;
//
// to import the objective surface in a single line.

pub mod prelude {
    pub use super::numerical_stability::{log_sum_exp_in_place, normalize_in_place};
    pub use super::objective::{AbcObjective, LogLikelihoodEstimator, Theta};
}
