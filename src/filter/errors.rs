//! Errors for the ABC particle filter (configuration checks, model-contract
//! violations, and distribution construction failures).
//!
//! This module defines a single error type, [`FilterError`], used across the
//! configuration layer, the resampling and weighting modules, the filter
//! engine, and the likelihood objective. It implements `Display`/`Error` and
//! converts to `PyErr` when the `python-bindings` feature is enabled.
//!
//! ## Conventions
//! - **Indices are 0-based** (particle slots and time steps alike).
//! - Configuration errors are raised while settings are normalized, before any
//!   particle is drawn.
//! - Model-contract errors (wrong lengths, non-finite proxies) are fatal: a run
//!   either returns a full output bundle or one of these errors.
//! - Numerical degeneracy is **not** an error. A step where every particle is
//!   rejected yields a log-likelihood of `-inf`, which is returned as data.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};
use statrs::distribution::{CauchyError, NormalError};

/// Crate-wide result alias for filter operations that may produce [`FilterError`].
pub type FilterResult<T> = Result<T, FilterError>;

/// Unified error type for the ABC particle filter.
///
/// Covers run configuration, tolerance schedules, model-contract violations,
/// observation checks, objective inputs, and wrapped `statrs` failures.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    // ---- Configuration ----
    /// Particle count must be at least one.
    InvalidParticleCount { n: usize },

    /// Horizon must be at least one step.
    InvalidHorizon { horizon: usize },

    /// Configured horizon disagrees with the horizon reported by the model.
    HorizonMismatch { configured: usize, model: usize },

    /// Unrecognized resampling scheme name.
    InvalidResampling { name: String, reason: &'static str },

    /// Unrecognized ABC kernel name.
    InvalidKernel { name: String, reason: &'static str },

    /// Unrecognized initial-state policy name.
    InvalidInitialPolicy { name: String, reason: &'static str },

    /// Fixed initial state must be finite.
    InvalidInitialValue { value: f64 },

    /// Tolerance must be finite and > 0.
    InvalidTolerance { index: usize, value: f64 },

    /// Tolerance schedule must be non-empty.
    EmptyToleranceSchedule,

    /// Tolerance schedule length must match the horizon.
    ToleranceScheduleLength { expected: usize, actual: usize },

    /// Adaptive resampling fraction must be finite and > 0.
    InvalidResampleFraction { value: f64 },

    /// Noisy ABC needs a kernel with a fixed width.
    NoisyAbcUnsupported { kernel: &'static str },

    // ---- Model contract ----
    /// Model returned an array of the wrong length.
    ModelOutputLength { output: &'static str, t: usize, expected: usize, actual: usize },

    /// Model was queried outside its horizon.
    TimeIndexOutOfRange { t: usize, horizon: usize },

    /// Simulated observation proxy is NaN/±inf.
    NonFiniteProxy { t: usize, index: usize, value: f64 },

    /// Model collaborator failed while sampling.
    ModelFailure { reason: String },

    // ---- Observations ----
    /// Observation series length must match the horizon.
    ObservationLength { expected: usize, actual: usize },

    /// An observation is NaN/±inf.
    NonFiniteObservation { t: usize, value: f64 },

    // ---- Resampling inputs ----
    /// Weight vector is empty.
    EmptyWeights,

    /// Weights must be finite and non-negative.
    InvalidWeight { index: usize, value: f64 },

    /// Weights must have a strictly positive sum.
    ZeroWeightSum,

    // ---- Output ----
    /// Particle slot is outside `[0, N)`.
    SlotOutOfRange { slot: usize, n: usize },

    /// Output requested before the filter was run.
    NotRun,

    // ---- Objective ----
    /// Parameter vector must have finite entries.
    InvalidTheta { index: usize, value: f64 },

    // ---- statrs distribution errors ----
    /// Wrapper for statrs::distribution::NormalError
    InvalidNormalParam,

    /// Wrapper for statrs::distribution::CauchyError
    InvalidCauchyParam,
}

impl std::error::Error for FilterError {}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Configuration ----
            FilterError::InvalidParticleCount { n } => {
                write!(f, "Particle count must be at least 1; got: {n}")
            }
            FilterError::InvalidHorizon { horizon } => {
                write!(f, "Horizon must be at least 1 step; got: {horizon}")
            }
            FilterError::HorizonMismatch { configured, model } => {
                write!(f, "Configured horizon ({configured}) differs from model horizon ({model}).")
            }
            FilterError::InvalidResampling { name, reason } => {
                write!(f, "Unknown resampling scheme '{name}'. {reason}")
            }
            FilterError::InvalidKernel { name, reason } => {
                write!(f, "Unknown ABC kernel '{name}'. {reason}")
            }
            FilterError::InvalidInitialPolicy { name, reason } => {
                write!(f, "Unknown initial-state policy '{name}'. {reason}")
            }
            FilterError::InvalidInitialValue { value } => {
                write!(f, "Fixed initial state must be finite; got: {value}")
            }
            FilterError::InvalidTolerance { index, value } => {
                write!(f, "Tolerance at step {index} must be finite and > 0; got: {value}")
            }
            FilterError::EmptyToleranceSchedule => {
                write!(f, "Tolerance schedule is empty.")
            }
            FilterError::ToleranceScheduleLength { expected, actual } => {
                write!(f, "Tolerance schedule length mismatch: expected {expected}, got {actual}")
            }
            FilterError::InvalidResampleFraction { value } => {
                write!(f, "Resample fraction must be finite and > 0; got: {value}")
            }
            FilterError::NoisyAbcUnsupported { kernel } => {
                write!(f, "Noisy ABC is not defined for the '{kernel}' kernel.")
            }
            // ---- Model contract ----
            FilterError::ModelOutputLength { output, t, expected, actual } => {
                write!(
                    f,
                    "Model returned {output} of length {actual} at step {t}; expected {expected}"
                )
            }
            FilterError::TimeIndexOutOfRange { t, horizon } => {
                write!(f, "Time index {t} is outside the model horizon ({horizon}).")
            }
            FilterError::NonFiniteProxy { t, index, value } => {
                write!(f, "Observation proxy for particle {index} at step {t} is non-finite: {value}")
            }
            FilterError::ModelFailure { reason } => {
                write!(f, "Model failed while sampling: {reason}")
            }
            // ---- Observations ----
            FilterError::ObservationLength { expected, actual } => {
                write!(f, "Observation length mismatch: expected {expected}, got {actual}")
            }
            FilterError::NonFiniteObservation { t, value } => {
                write!(f, "Observation at step {t} is non-finite: {value}")
            }
            // ---- Resampling inputs ----
            FilterError::EmptyWeights => {
                write!(f, "Weight vector is empty.")
            }
            FilterError::InvalidWeight { index, value } => {
                write!(f, "Weight at index {index} must be finite and >= 0; got: {value}")
            }
            FilterError::ZeroWeightSum => {
                write!(f, "Weights must have a strictly positive sum.")
            }
            // ---- Output ----
            FilterError::SlotOutOfRange { slot, n } => {
                write!(f, "Particle slot {slot} is out of range for {n} particles.")
            }
            FilterError::NotRun => {
                write!(f, "Filter has not been run yet; call run() first.")
            }
            // ---- Objective ----
            FilterError::InvalidTheta { index, value } => {
                write!(f, "Theta input at index {index} must be finite, got {value}")
            }
            // ---- statrs distribution errors ----
            FilterError::InvalidNormalParam => {
                write!(f, "Normal distribution requires a finite mean and standard deviation > 0.")
            }
            FilterError::InvalidCauchyParam => {
                write!(f, "Cauchy distribution requires a finite location and scale > 0.")
            }
        }
    }
}

/// Convert a [`FilterError`] into a Python `ValueError` with the error message.
///
/// This is used at the Rust↔Python boundary to surface filter errors cleanly.
#[cfg(feature = "python-bindings")]
impl std::convert::From<FilterError> for PyErr {
    fn from(err: FilterError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<NormalError> for FilterError {
    fn from(_: NormalError) -> FilterError {
        FilterError::InvalidNormalParam
    }
}

impl From<CauchyError> for FilterError {
    fn from(_: CauchyError) -> FilterError {
        FilterError::InvalidCauchyParam
    }
}
