//! Resampling schemes and effective sample size for the particle filter.
//!
//! This module provides:
//! - A `ResamplingScheme` enum with the three classical schemes (stratified,
//!   systematic, multinomial), selected once at configuration time.
//! - `ResamplingScheme::resample`, which maps a weight vector to a length-N
//!   ancestor index vector.
//! - `effective_sample_size`, the `1/Σw²` degeneracy diagnostic that drives
//!   adaptive resampling.
//!
//! Conventions:
//! - All schemes share one inverse-CDF walk over sorted positions in `[0, 1)`:
//!   a position `u` selects the smallest index `j` with `cdf[j] >= u`, so a
//!   position landing exactly on a boundary goes to the lower index.
//! - The walk never advances past `N − 1`. When rounding leaves the last
//!   cumulative weight slightly below one, positions above it are assigned to
//!   `N − 1`.
//! - Weights need not be normalized; the CDF is scaled by their sum.
use crate::filter::{
    core::validation::validate_weights,
    errors::{FilterError, FilterResult},
};
use ndarray::{Array1, ArrayView1};
use rand::Rng;
use std::str::FromStr;

/// Resampling scheme.
///
/// - `Stratified`: one uniform draw inside each of `N` equal strata of `[0, 1)`.
/// - `Systematic`: a single uniform offset shared by `N` evenly spaced points;
///   lowest variance of the three.
/// - `Multinomial`: `N` independent uniform draws; highest-variance baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResamplingScheme {
    Stratified,
    Systematic,
    Multinomial,
}

impl ResamplingScheme {
    /// Draw `N = weights.len()` ancestor indices.
    ///
    /// # Arguments
    /// - `weights`: non-negative weights with a positive sum (normalized or not).
    /// - `rng`: source of the uniform draws.
    ///
    /// # Returns
    /// Indices in `[0, N)`, non-decreasing in slot order.
    ///
    /// # Errors
    /// Propagates [`validate_weights`] failures (`EmptyWeights`,
    /// `InvalidWeight`, `ZeroWeightSum`).
    pub fn resample<R: Rng>(
        &self, weights: ArrayView1<f64>, rng: &mut R,
    ) -> FilterResult<Array1<usize>> {
        validate_weights(weights)?;
        let n = weights.len();
        let step = 1.0 / n as f64;
        let positions: Vec<f64> = match self {
            ResamplingScheme::Stratified => {
                (0..n).map(|i| (i as f64 + rng.random::<f64>()) * step).collect()
            }
            ResamplingScheme::Systematic => {
                let offset = rng.random::<f64>();
                (0..n).map(|i| (i as f64 + offset) * step).collect()
            }
            ResamplingScheme::Multinomial => {
                let mut draws: Vec<f64> = (0..n).map(|_| rng.random::<f64>()).collect();
                draws.sort_by(f64::total_cmp);
                draws
            }
        };
        Ok(inverse_cdf(&cumulative_weights(weights), &positions))
    }

    /// Lower-case name used in configuration and log messages.
    pub fn name(&self) -> &'static str {
        match self {
            ResamplingScheme::Stratified => "stratified",
            ResamplingScheme::Systematic => "systematic",
            ResamplingScheme::Multinomial => "multinomial",
        }
    }
}

impl FromStr for ResamplingScheme {
    type Err = FilterError;

    /// Parse a resampling scheme from a string (case-insensitive).
    ///
    /// Accepts `"stratified"`, `"systematic"`, and `"multinomial"`; anything
    /// else returns `FilterError::InvalidResampling`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stratified" => Ok(ResamplingScheme::Stratified),
            "systematic" => Ok(ResamplingScheme::Systematic),
            "multinomial" => Ok(ResamplingScheme::Multinomial),
            _ => Err(FilterError::InvalidResampling {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'stratified', 'systematic' or \
                         'multinomial'.",
            }),
        }
    }
}

/// Effective sample size `1 / Σ w_i²` of a normalized weight vector.
///
/// Lies in `[1, N]` for normalized weights: `N` for uniform weights, `1` when a
/// single particle carries all the mass.
pub fn effective_sample_size(weights: ArrayView1<f64>) -> f64 {
    let sum_sq: f64 = weights.iter().map(|w| w * w).sum();
    1.0 / sum_sq
}

/// Draw a single index from `weights` using one uniform variate.
///
/// Used to pick the particle whose lineage becomes the sampled trajectory.
pub fn draw_index<R: Rng>(weights: ArrayView1<f64>, rng: &mut R) -> FilterResult<usize> {
    validate_weights(weights)?;
    let u = rng.random::<f64>();
    Ok(inverse_cdf(&cumulative_weights(weights), &[u])[0])
}

/// Running sum of `weights` scaled so that the last entry is (close to) one.
fn cumulative_weights(weights: ArrayView1<f64>) -> Vec<f64> {
    let total = weights.sum();
    let mut acc = 0.0;
    weights
        .iter()
        .map(|w| {
            acc += w;
            acc / total
        })
        .collect()
}

/// Two-pointer inverse-CDF walk over ascending `positions`.
fn inverse_cdf(cdf: &[f64], positions: &[f64]) -> Array1<usize> {
    let last = cdf.len() - 1;
    let mut j = 0usize;
    positions
        .iter()
        .map(|&u| {
            while j < last && cdf[j] < u {
                j += 1;
            }
            j
        })
        .collect()
}
