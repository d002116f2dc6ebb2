//! State-space model interface consumed by the ABC particle filter.
//!
//! The filter never evaluates an observation density. It only needs to
//! *simulate* from the model: draw initial states, propagate states one step,
//! and produce observation proxies for a set of states. [`StateSpaceModel`]
//! captures exactly those three capabilities plus the model horizon.
//!
//! Conventions:
//! - All arrays are indexed by particle slot and have length `N`.
//! - `sample_transition(previous, t, ..)` maps states at time `t` to states at
//!   `t + 1`; the engine calls it with `t − 1` when building step `t`.
//! - `simulate_observation(states, t, ..)` produces proxies for time `t`.
//! - Randomness comes from the RNG handed in by the engine, so a seed fixes
//!   the entire run.
use crate::filter::errors::FilterResult;
use ndarray::{Array1, ArrayView1};
use rand::Rng;

/// Simulated observations for one step.
///
/// `primary` is compared with the observation by the ABC kernel. The two
/// `auxiliary` arrays carry model-specific by-products (e.g. the noise-free
/// observation mean) and are stored in the output for diagnostics only.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationProxies {
    pub primary: Array1<f64>,
    pub auxiliary: [Array1<f64>; 2],
}

impl ObservationProxies {
    /// Proxies with zero-filled auxiliary arrays.
    pub fn new(primary: Array1<f64>) -> Self {
        let n = primary.len();
        ObservationProxies { primary, auxiliary: [Array1::zeros(n), Array1::zeros(n)] }
    }

    pub fn with_auxiliary(primary: Array1<f64>, first: Array1<f64>, second: Array1<f64>) -> Self {
        ObservationProxies { primary, auxiliary: [first, second] }
    }
}

/// Simulation interface of a scalar-state state-space model.
///
/// Implementors are expected to:
/// - return arrays with exactly as many entries as states passed in (or `n`
///   for [`StateSpaceModel::sample_initial`]); the engine rejects other
///   lengths with `FilterError::ModelOutputLength`;
/// - return `FilterError::TimeIndexOutOfRange` (see
///   `filter::core::validation::validate_time_index`) for `t >= horizon()`;
/// - report sampling failures as `FilterError::ModelFailure`.
pub trait StateSpaceModel {
    /// Number of time steps `T` the model (and its data) covers.
    fn horizon(&self) -> usize;

    /// Draw `n` initial states.
    fn sample_initial<R: Rng>(&self, n: usize, rng: &mut R) -> FilterResult<Array1<f64>>;

    /// Draw next states given `previous` states at time `t`.
    fn sample_transition<R: Rng>(
        &self, previous: ArrayView1<f64>, t: usize, rng: &mut R,
    ) -> FilterResult<Array1<f64>>;

    /// Simulate observation proxies for `states` at time `t`.
    fn simulate_observation<R: Rng>(
        &self, states: ArrayView1<f64>, t: usize, rng: &mut R,
    ) -> FilterResult<ObservationProxies>;
}
