//! Numerical stability utilities.
//!
//! Provides guarded implementations of the weight manipulations that sit in
//! the inner loop of the ABC filter, where naïve `exp`/`ln` arithmetic on
//! log-densities overflows or underflows.
//!
//! # Provided items
//! - [`MIN_BANDWIDTH`]: floor applied to adaptive kernel bandwidths so that a
//!   zero-variance proxy cloud never produces a zero-width kernel.
//! - [`WEIGHT_SUM_TOL`]: tolerance used when checking that a weight column
//!   sums to one.
//! - [`log_sum_exp_in_place`]: max-shifted log-sum-exp that also leaves the
//!   shifted weights in the buffer.
//! - [`normalize_in_place`]: divide a weight vector by its sum, falling back to
//!   uniform weights when the sum is zero.
//!
//! # Rationale
//! Gaussian and Cauchy log-densities of distant proxies can be far below
//! `ln(f64::MIN_POSITIVE)`. Shifting by the maximum before exponentiating keeps
//! the largest weight at exactly one, so at least one weight is representable.
use ndarray::{ArrayView1, ArrayViewMut1, Zip};

/// Floor for adaptive kernel bandwidths.
///
/// The quasi-Cauchy bandwidth is proportional to the standard deviation of the
/// proxies. When all proxies coincide the rule yields zero, which is not a
/// valid Cauchy scale; the bandwidth is clamped to this value instead.
pub const MIN_BANDWIDTH: f64 = 1e-12;

/// Absolute tolerance for "weights sum to one" checks.
pub const WEIGHT_SUM_TOL: f64 = 1e-9;

/// Max-shifted log-sum-exp, computed in place.
///
/// On entry `log_weights` holds log-weights `ℓ_i`. On exit it holds
/// `exp(ℓ_i − m)` where `m = max_i ℓ_i`, and the function returns
/// `m + ln Σ_i exp(ℓ_i − m) = ln Σ_i exp(ℓ_i)`.
///
/// # Edge cases
/// - Empty input returns `-inf` and leaves the buffer untouched.
/// - If every `ℓ_i` is `-inf`, the buffer is zeroed and `-inf` is returned;
///   the caller treats this as total rejection.
///
/// # Parameters
/// - `log_weights`: mutable view over log-weights; all entries must be
///   `-inf` or finite.
///
/// # Returns
/// - `ln Σ exp(ℓ_i)` as `f64`.
pub fn log_sum_exp_in_place(mut log_weights: ArrayViewMut1<f64>) -> f64 {
    let max = log_weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        log_weights.fill(0.0);
        return f64::NEG_INFINITY;
    }
    log_weights.mapv_inplace(|lw| (lw - max).exp());
    max + log_weights.sum().ln()
}

/// Normalize a non-negative weight vector to unit sum.
///
/// Returns `true` when the weights were normalized and `false` when their sum
/// was zero (or not finite), in which case the vector is reset to uniform
/// `1/N` weights.
pub fn normalize_in_place(mut weights: ArrayViewMut1<f64>) -> bool {
    let n = weights.len();
    let total = weights.sum();
    if total > 0.0 && total.is_finite() {
        weights.mapv_inplace(|w| w / total);
        true
    } else {
        weights.fill(1.0 / n as f64);
        false
    }
}

/// Weighted mean `Σ w_i x_i` of two equally long views.
pub fn weighted_mean(weights: ArrayView1<f64>, values: ArrayView1<f64>) -> f64 {
    Zip::from(&weights).and(&values).fold(0.0, |acc, &w, &x| acc + w * x)
}
