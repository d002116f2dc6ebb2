//! filter — ABC particle filtering for state-space models.
//!
//! Purpose
//! -------
//! Estimate the log-likelihood of a nonlinear, non-Gaussian state-space model
//! at a fixed parameter value when the observation density cannot be
//! evaluated, only simulated from. Each observation is compared with
//! simulated proxies through an ABC kernel, and the resulting weights drive a
//! sequential importance resampling filter.
//!
//! Key behaviors
//! -------------
//! - [`core`]: resampling schemes, ABC kernels, tolerance schedules,
//!   initialization policies, configuration, output bundle, noisy-ABC
//!   perturbation, and validation helpers.
//! - [`models`]: the [`StateSpaceModel`] interface and the
//!   [`AbcParticleFilter`] engine.
//! - [`errors`]: the crate-wide [`FilterError`] and [`FilterResult`] alias.
//!
//! Invariants & assumptions
//! ------------------------
//! - `N` and `T` are fixed for a run; every per-step array is allocated once
//!   and fully overwritten.
//! - Weight columns are non-negative and sum to one; ESS lies in `[1, N]`;
//!   ancestry entries lie in `[0, N)`.
//! - The log-likelihood may be `-inf` (total rejection); that is data, not an
//!   error.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based for particle slots and time steps.
//! - Configuration errors surface before the first particle is drawn;
//!   model-contract errors abort the run at the offending step.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each submodule; `tests/integration_abc_filter.rs`
//!   exercises full runs against a linear-Gaussian model with a known
//!   Kalman-filter likelihood.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    AbcKernel, FilterOptions, FilterOutput, FilterSettings, InitialState, ResamplePolicy,
    ResamplingScheme, TolerancePolicy, ToleranceSchedule, perturb_observations,
};

pub use self::errors::{FilterError, FilterResult};

pub use self::models::{AbcParticleFilter, ObservationProxies, StateSpaceModel};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use abc_smc::filter::prelude::*;
//
// to import the main filtering surface in a single line.

pub mod prelude {
    pub use super::{
        AbcKernel, AbcParticleFilter, FilterError, FilterOptions, FilterOutput, FilterResult,
        FilterSettings, InitialState, ObservationProxies, ResamplePolicy, ResamplingScheme,
        StateSpaceModel, TolerancePolicy, ToleranceSchedule, perturb_observations,
    };
}
