//! ABC weighting kernels.
//!
//! This module provides:
//! - An `AbcKernel` enum with the three weighting rules (boxcar, Gaussian,
//!   quasi-Cauchy), selected once at configuration time.
//! - `AbcKernel::weigh_into`, which writes unnormalized particle weights for one
//!   step into a caller-owned column and returns the step's log-likelihood
//!   increment.
//! - `qcauchy_bandwidth`, the adaptive bandwidth rule of the quasi-Cauchy kernel.
//!
//! Conventions:
//! - Inputs are the `N` simulated proxies at step `t`, the scalar observation
//!   `y_t`, and the step tolerance `ε_t`. Proxies are assumed finite; the
//!   engine checks them before weighting.
//! - Increments are on the log scale and include the `−ln N` Monte Carlo
//!   average. A step that rejects every particle yields `-inf`.
//! - Smooth kernels leave max-shifted weights `exp(ℓ_i − max ℓ)` in the
//!   column, so the largest weight is exactly one before normalization.
use crate::{
    filter::errors::{FilterError, FilterResult},
    optimization::numerical_stability::transformations::{MIN_BANDWIDTH, log_sum_exp_in_place},
};
use ndarray::{Array1, ArrayView1, ArrayViewMut1, Zip};
use statrs::distribution::{Cauchy, Continuous, Normal};
use std::{f64::consts::PI, str::FromStr};

/// ABC weighting kernel.
///
/// - `Boxcar`: accept/reject within `±ε_t`; weights are 0 or 1.
/// - `Gaussian`: Gaussian density of `y_t − proxy` with standard deviation `ε_t`.
/// - `QuasiCauchy`: Cauchy density of `y_t − proxy` with a bandwidth estimated
///   from the proxies at each step; `ε_t` is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbcKernel {
    Boxcar,
    Gaussian,
    QuasiCauchy,
}

/// Per-step summary returned by [`AbcKernel::weigh_into`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelStep {
    /// `ln p̂(y_t | y_{0:t−1})`, possibly `-inf`.
    pub loglik_increment: f64,
    /// Kernel width actually used: `ε_t` for boxcar/Gaussian, the adaptive
    /// bandwidth for quasi-Cauchy.
    pub bandwidth: f64,
}

/// Owned result of [`AbcKernel::weigh`].
#[derive(Debug, Clone, PartialEq)]
pub struct KernelOutput {
    pub weights: Array1<f64>,
    pub loglik_increment: f64,
    pub bandwidth: f64,
}

impl AbcKernel {
    /// Weight one step's proxies into `weights`.
    ///
    /// # Arguments
    /// - `proxies`: simulated observations, one per particle.
    /// - `observation`: the observed value `y_t`.
    /// - `tolerance`: validated `ε_t > 0`.
    /// - `weights`: output column of the same length as `proxies`; fully overwritten.
    ///
    /// # Errors
    /// - `FilterError::ModelOutputLength` if `weights` and `proxies` differ in length.
    /// - `FilterError::InvalidNormalParam` / `InvalidCauchyParam` if the kernel
    ///   distribution cannot be built from the width.
    pub fn weigh_into(
        &self, proxies: ArrayView1<f64>, observation: f64, tolerance: f64,
        mut weights: ArrayViewMut1<f64>,
    ) -> FilterResult<KernelStep> {
        if weights.len() != proxies.len() {
            return Err(FilterError::ModelOutputLength {
                output: "weights",
                t: 0,
                expected: proxies.len(),
                actual: weights.len(),
            });
        }
        let ln_n = (proxies.len() as f64).ln();
        match self {
            AbcKernel::Boxcar => {
                Zip::from(&mut weights).and(&proxies).for_each(|w, &v| {
                    *w = if (v - observation).abs() < tolerance { 1.0 } else { 0.0 };
                });
                let accepted = weights.sum();
                let loglik_increment = if accepted > 0.0 {
                    accepted.ln() - ln_n - tolerance.ln()
                } else {
                    f64::NEG_INFINITY
                };
                Ok(KernelStep { loglik_increment, bandwidth: tolerance })
            }
            AbcKernel::Gaussian => {
                let density = Normal::new(0.0, tolerance)?;
                Zip::from(&mut weights)
                    .and(&proxies)
                    .for_each(|w, &v| *w = density.ln_pdf(observation - v));
                let lse = log_sum_exp_in_place(weights);
                Ok(KernelStep { loglik_increment: lse - ln_n, bandwidth: tolerance })
            }
            AbcKernel::QuasiCauchy => {
                let bandwidth = qcauchy_bandwidth(proxies);
                let density = Cauchy::new(0.0, bandwidth)?;
                Zip::from(&mut weights)
                    .and(&proxies)
                    .for_each(|w, &v| *w = density.ln_pdf(observation - v));
                let lse = log_sum_exp_in_place(weights);
                Ok(KernelStep { loglik_increment: lse - ln_n, bandwidth })
            }
        }
    }

    /// Allocating variant of [`AbcKernel::weigh_into`].
    pub fn weigh(
        &self, proxies: ArrayView1<f64>, observation: f64, tolerance: f64,
    ) -> FilterResult<KernelOutput> {
        let mut weights = Array1::zeros(proxies.len());
        let step = self.weigh_into(proxies, observation, tolerance, weights.view_mut())?;
        Ok(KernelOutput {
            weights,
            loglik_increment: step.loglik_increment,
            bandwidth: step.bandwidth,
        })
    }

    /// Whether the kernel reads the configured tolerance.
    pub fn uses_tolerance(&self) -> bool {
        !matches!(self, AbcKernel::QuasiCauchy)
    }

    /// Lower-case name used in configuration and log messages.
    pub fn name(&self) -> &'static str {
        match self {
            AbcKernel::Boxcar => "boxcar",
            AbcKernel::Gaussian => "gaussian",
            AbcKernel::QuasiCauchy => "qcauchy",
        }
    }
}

impl FromStr for AbcKernel {
    type Err = FilterError;

    /// Parse a kernel name (case-insensitive).
    ///
    /// Accepts `"boxcar"`, `"gaussian"`, and `"qcauchy"`; anything else returns
    /// `FilterError::InvalidKernel`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "boxcar" => Ok(AbcKernel::Boxcar),
            "gaussian" => Ok(AbcKernel::Gaussian),
            "qcauchy" => Ok(AbcKernel::QuasiCauchy),
            _ => Err(FilterError::InvalidKernel {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'boxcar', 'gaussian' or 'qcauchy'.",
            }),
        }
    }
}

/// Adaptive quasi-Cauchy bandwidth for one step.
///
/// With `S` the population variance of the proxies and `N` their count:
/// `P = 3 / (8√π) · S^(−5/2)` and `h = (5π⁴ / (128 · N · P))^(1/5)`.
///
/// The result is floored at [`MIN_BANDWIDTH`], which covers `S = 0` (all
/// proxies equal) where the rule degenerates to zero.
pub fn qcauchy_bandwidth(proxies: ArrayView1<f64>) -> f64 {
    let n = proxies.len() as f64;
    let mean = proxies.sum() / n;
    let variance = proxies.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let roughness = 3.0 / (8.0 * PI.sqrt()) * variance.powf(-2.5);
    let h = (5.0 * PI.powi(4) / (128.0 * n * roughness)).powf(0.2);
    if h.is_finite() { h.max(MIN_BANDWIDTH) } else { MIN_BANDWIDTH }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    const KERNELS: [AbcKernel; 3] = [AbcKernel::Boxcar, AbcKernel::Gaussian, AbcKernel::QuasiCauchy];

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Boxcar acceptance, its wide-tolerance limit, and total rejection.
    // - Gaussian and quasi-Cauchy increments against closed forms.
    // - Translation invariance of the smooth kernels.
    // - The quasi-Cauchy bandwidth rule and its floor.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify boxcar weights and increment on a small hand-checked case.
    //
    // Given
    // -----
    // - Proxies (0.0, 0.4, 1.2, -0.05), observation 0.1, tolerance 0.5.
    //
    // Expect
    // ------
    // - Weights (1, 1, 0, 1) and increment ln 3 − ln 4 − ln 0.5.
    fn boxcar_counts_accepted_particles() {
        // Arrange
        let proxies = array![0.0, 0.4, 1.2, -0.05];

        // Act
        let out = AbcKernel::Boxcar.weigh(proxies.view(), 0.1, 0.5).unwrap();

        // Assert
        assert_eq!(out.weights, array![1.0, 1.0, 0.0, 1.0]);
        assert_relative_eq!(out.loglik_increment, 3f64.ln() - 4f64.ln() - 0.5f64.ln());
        assert_eq!(out.bandwidth, 0.5);
    }

    #[test]
    // Purpose
    // -------
    // Verify the two boxcar limits.
    //
    // Given
    // -----
    // - Spread-out proxies weighed with a huge tolerance and with a tiny one.
    //
    // Expect
    // ------
    // - Huge tolerance accepts everything: increment = −ln ε.
    // - Tiny tolerance accepts nothing: increment = −inf, weights all zero.
    fn boxcar_tolerance_limits() {
        // Arrange
        let proxies = array![-3.0, -1.0, 0.5, 2.0, 7.0];
        let wide = 1e6;

        // Act
        let all = AbcKernel::Boxcar.weigh(proxies.view(), 0.25, wide).unwrap();
        let none = AbcKernel::Boxcar.weigh(proxies.view(), 0.25, 1e-12).unwrap();

        // Assert
        assert_relative_eq!(all.loglik_increment, -wide.ln(), epsilon = 1e-12);
        assert_eq!(none.loglik_increment, f64::NEG_INFINITY);
        assert!(none.weights.iter().all(|&w| w == 0.0));
    }

    #[test]
    // Purpose
    // -------
    // Verify the Gaussian increment against the closed-form density.
    //
    // Given
    // -----
    // - Two proxies at distance 0 and 0.2 from the observation, ε = 0.1.
    //
    // Expect
    // ------
    // - Increment = ln((φ(0) + φ(0.2)) / 2) with φ the N(0, 0.1²) density.
    // - The largest shifted weight is exactly one.
    fn gaussian_increment_matches_closed_form() {
        // Arrange
        let proxies = array![1.0, 1.2];
        let sd: f64 = 0.1;
        let phi = |x: f64| (-(x * x) / (2.0 * sd * sd)).exp() / (sd * (2.0 * PI).sqrt());

        // Act
        let out = AbcKernel::Gaussian.weigh(proxies.view(), 1.0, sd).unwrap();

        // Assert
        let expected = ((phi(0.0) + phi(0.2)) / 2.0).ln();
        assert_relative_eq!(out.loglik_increment, expected, epsilon = 1e-10);
        assert_eq!(out.weights[0], 1.0);
        assert_relative_eq!(out.weights[1], (-2.0f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn gaussian_far_proxies_do_not_underflow() {
        let proxies = array![1_000.0, 1_000.5];
        let out = AbcKernel::Gaussian.weigh(proxies.view(), 0.0, 0.1).unwrap();
        assert!(out.loglik_increment.is_finite());
        assert!(out.weights.sum() >= 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify that smooth-kernel increments depend only on y − proxy.
    //
    // Given
    // -----
    // - Proxies and an observation, then the same shifted by +37.5.
    //
    // Expect
    // ------
    // - Identical increments (to rounding) for Gaussian and quasi-Cauchy.
    fn smooth_kernels_are_translation_invariant() {
        // Arrange
        let proxies = array![-0.3, 0.1, 0.25, 0.8, 1.1];
        let shift = 37.5;
        let shifted = proxies.mapv(|v| v + shift);

        for kernel in [AbcKernel::Gaussian, AbcKernel::QuasiCauchy] {
            // Act
            let base = kernel.weigh(proxies.view(), 0.2, 0.3).unwrap();
            let moved = kernel.weigh(shifted.view(), 0.2 + shift, 0.3).unwrap();

            // Assert
            assert_abs_diff_eq!(base.loglik_increment, moved.loglik_increment, epsilon = 1e-9);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the quasi-Cauchy bandwidth rule and its floor.
    //
    // Given
    // -----
    // - Proxies (1, 2, 3, 4) with population variance 1.25, and constant proxies.
    //
    // Expect
    // ------
    // - The bandwidth equals the rule evaluated by hand.
    // - Constant proxies give `MIN_BANDWIDTH` and still weigh without error.
    fn qcauchy_bandwidth_rule_and_floor() {
        // Arrange
        let proxies = array![1.0, 2.0, 3.0, 4.0];
        let constant = Array1::from_elem(6, 0.7);
        let s: f64 = 1.25;
        let p = 3.0 / (8.0 * PI.sqrt()) * s.powf(-2.5);
        let expected = (5.0 * PI.powi(4) / (128.0 * 4.0 * p)).powf(0.2);

        // Act
        let h = qcauchy_bandwidth(proxies.view());
        let floored = qcauchy_bandwidth(constant.view());
        let out = AbcKernel::QuasiCauchy.weigh(constant.view(), 0.7, 1.0).unwrap();

        // Assert
        assert_relative_eq!(h, expected, epsilon = 1e-12);
        assert_eq!(floored, MIN_BANDWIDTH);
        assert_eq!(out.bandwidth, MIN_BANDWIDTH);
        assert!(out.loglik_increment.is_finite());
    }

    #[test]
    fn qcauchy_ignores_tolerance() {
        let proxies = array![0.0, 0.5, 1.5];
        let a = AbcKernel::QuasiCauchy.weigh(proxies.view(), 0.4, 0.01).unwrap();
        let b = AbcKernel::QuasiCauchy.weigh(proxies.view(), 0.4, 10.0).unwrap();
        assert_eq!(a, b);
        assert!(!AbcKernel::QuasiCauchy.uses_tolerance());
    }

    #[test]
    fn rejects_mismatched_output_column() {
        let proxies = array![0.0, 1.0];
        let mut column = Array1::zeros(3);
        assert!(matches!(
            AbcKernel::Boxcar.weigh_into(proxies.view(), 0.0, 1.0, column.view_mut()),
            Err(FilterError::ModelOutputLength { expected: 2, actual: 3, .. })
        ));
    }

    #[test]
    fn parses_kernel_names() {
        assert_eq!("Boxcar".parse::<AbcKernel>(), Ok(AbcKernel::Boxcar));
        assert_eq!("QCAUCHY".parse::<AbcKernel>(), Ok(AbcKernel::QuasiCauchy));
        assert!(matches!("epanechnikov".parse::<AbcKernel>(), Err(FilterError::InvalidKernel { .. })));
        for kernel in KERNELS {
            assert_eq!(kernel.name().parse::<AbcKernel>(), Ok(kernel));
        }
    }
}
