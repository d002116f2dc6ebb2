//! core — building blocks of the ABC particle filter.
//!
//! Purpose
//! -------
//! Collect the pieces the filter engine is assembled from: resampling
//! schemes, ABC weighting kernels, tolerance schedules, initialization
//! policies, run configuration, the output bundle, noisy-ABC perturbation, and
//! shared validation helpers. The engine in `filter::models` only sequences
//! these; all per-step numerics live here.
//!
//! Key behaviors
//! -------------
//! - Map weights to ancestor indices ([`ResamplingScheme`]) and measure
//!   degeneracy ([`effective_sample_size`]).
//! - Map proxies and an observation to weights and a log-likelihood increment
//!   ([`AbcKernel`]).
//! - Normalize user settings into validated options ([`FilterSettings`],
//!   [`FilterOptions`]) before any particle is drawn.
//! - Reconstruct particle histories from parent pointers ([`FilterOutput`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Every `N×T` matrix uses rows for particle slots and columns for time.
//! - Resampled indices always lie in `[0, N)`.
//! - Tolerances are finite and strictly positive once validated.
//!
//! Conventions
//! -----------
//! - Randomness is always drawn from a caller-supplied `rand::Rng`; nothing
//!   in this module owns an RNG.
//! - This module performs no logging; the engine reports per-step
//!   diagnostics.
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule cover their numerics and every error path;
//!   end-to-end behavior is covered by the engine tests and `tests/`.

pub mod init;
pub mod kernels;
pub mod noisy;
pub mod options;
pub mod output;
pub mod resampling;
pub mod tolerance;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::init::InitialState;
pub use self::kernels::{AbcKernel, KernelOutput, KernelStep, qcauchy_bandwidth};
pub use self::noisy::perturb_observations;
pub use self::options::{
    DEFAULT_PARTICLES, DEFAULT_RESAMPLE_FRACTION, DEFAULT_SEED, DEFAULT_TOLERANCE, FilterOptions,
    FilterSettings, ResamplePolicy,
};
pub use self::output::FilterOutput;
pub use self::resampling::{ResamplingScheme, draw_index, effective_sample_size};
pub use self::tolerance::{TolerancePolicy, ToleranceSchedule};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use abc_smc::filter::core::prelude::*;
//
// to import the main configuration and output types in a single line.

pub mod prelude {
    pub use super::init::InitialState;
    pub use super::kernels::AbcKernel;
    pub use super::options::{FilterOptions, FilterSettings, ResamplePolicy};
    pub use super::output::FilterOutput;
    pub use super::resampling::ResamplingScheme;
    pub use super::tolerance::{TolerancePolicy, ToleranceSchedule};
}
