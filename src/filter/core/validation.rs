//! validation — shared input guards for the ABC particle filter.
//!
//! Purpose
//! -------
//! Centralize the preconditions checked by the configuration layer, the
//! resampling module, and the filter engine so that every caller reports the
//! same [`FilterError`] variant for the same failure.
//!
//! Key behaviors
//! -------------
//! - Check scalar settings (particle count, horizon, tolerance, resample
//!   fraction, fixed initial value) at normalization time.
//! - Check the model contract at run time: output lengths, time indices, and
//!   finiteness of simulated proxies.
//! - Check caller-supplied arrays: observation series, weight vectors, and
//!   objective parameter vectors.
//!
//! Invariants & assumptions
//! ------------------------
//! - Validators never mutate their inputs and allocate only for error payloads.
//! - A successful return is a guarantee that the documented precondition
//!   holds; downstream code does not re-check.
//!
//! Conventions
//! -----------
//! - Indices in error payloads are 0-based.
//! - Model-contract validators take the step index `t` so that errors point to
//!   the exact step where the collaborator misbehaved.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each error branch and a success path per validator.
use crate::filter::errors::{FilterError, FilterResult};
use ndarray::ArrayView1;

/// Require at least one particle.
pub fn validate_particle_count(n: usize) -> FilterResult<usize> {
    if n == 0 {
        return Err(FilterError::InvalidParticleCount { n });
    }
    Ok(n)
}

/// Require a horizon of at least one step.
pub fn validate_horizon(horizon: usize) -> FilterResult<usize> {
    if horizon == 0 {
        return Err(FilterError::InvalidHorizon { horizon });
    }
    Ok(horizon)
}

/// Require a finite, strictly positive tolerance. `index` is the step the
/// tolerance applies to (0 for scalar tolerances).
pub fn validate_tolerance(index: usize, value: f64) -> FilterResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FilterError::InvalidTolerance { index, value });
    }
    Ok(value)
}

/// Require a finite, strictly positive adaptive-resampling fraction.
///
/// Fractions above one are accepted; they make the ESS test always fire.
pub fn validate_resample_fraction(value: f64) -> FilterResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FilterError::InvalidResampleFraction { value });
    }
    Ok(value)
}

/// Require a finite fixed initial state.
pub fn validate_initial_value(value: f64) -> FilterResult<f64> {
    if !value.is_finite() {
        return Err(FilterError::InvalidInitialValue { value });
    }
    Ok(value)
}

/// Validate the observation series against the run horizon.
///
/// Errors
/// ------
/// - `FilterError::ObservationLength` when `observations.len() != horizon`.
/// - `FilterError::NonFiniteObservation` on the first NaN/±inf entry.
pub fn validate_observations(observations: ArrayView1<f64>, horizon: usize) -> FilterResult<()> {
    if observations.len() != horizon {
        return Err(FilterError::ObservationLength {
            expected: horizon,
            actual: observations.len(),
        });
    }
    if let Some((t, &value)) = observations.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(FilterError::NonFiniteObservation { t, value });
    }
    Ok(())
}

/// Validate the length of an array returned by the model at step `t`.
pub fn validate_model_output(
    output: &'static str, t: usize, expected: usize, actual: usize,
) -> FilterResult<()> {
    if expected != actual {
        return Err(FilterError::ModelOutputLength { output, t, expected, actual });
    }
    Ok(())
}

/// Check that a time index lies inside the model horizon.
///
/// Model implementations call this at the top of their samplers so that a
/// caller driving them outside `0..horizon` gets a contract error instead of
/// an out-of-bounds panic.
pub fn validate_time_index(t: usize, horizon: usize) -> FilterResult<()> {
    if t >= horizon {
        return Err(FilterError::TimeIndexOutOfRange { t, horizon });
    }
    Ok(())
}

/// Require every simulated proxy at step `t` to be finite.
pub fn validate_proxies(proxies: ArrayView1<f64>, t: usize) -> FilterResult<()> {
    if let Some((index, &value)) = proxies.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(FilterError::NonFiniteProxy { t, index, value });
    }
    Ok(())
}

/// Validate a weight vector handed to a resampling scheme.
///
/// Weights need not be normalized, but must be non-empty, finite,
/// non-negative, and have a strictly positive sum.
pub fn validate_weights(weights: ArrayView1<f64>) -> FilterResult<()> {
    if weights.is_empty() {
        return Err(FilterError::EmptyWeights);
    }
    if let Some((index, &value)) =
        weights.iter().enumerate().find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(FilterError::InvalidWeight { index, value });
    }
    if weights.sum() <= 0.0 {
        return Err(FilterError::ZeroWeightSum);
    }
    Ok(())
}

/// Require a parameter vector with finite entries.
pub fn validate_theta(theta: ArrayView1<f64>) -> FilterResult<()> {
    if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(FilterError::InvalidTheta { index, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover every error branch of the validators in this module
    // plus one success path each. Engine-level behavior on invalid model
    // output is covered by the filter engine tests.
    // -------------------------------------------------------------------------

    #[test]
    fn scalar_settings_reject_invalid_values() {
        assert_eq!(validate_particle_count(0), Err(FilterError::InvalidParticleCount { n: 0 }));
        assert_eq!(validate_particle_count(5), Ok(5));
        assert_eq!(validate_horizon(0), Err(FilterError::InvalidHorizon { horizon: 0 }));
        assert_eq!(validate_horizon(12), Ok(12));
        assert!(validate_tolerance(2, 0.0).is_err());
        assert!(validate_tolerance(2, f64::INFINITY).is_err());
        assert_eq!(validate_tolerance(0, 0.1), Ok(0.1));
        assert!(validate_resample_fraction(-0.5).is_err());
        assert!(validate_resample_fraction(f64::NAN).is_err());
        assert_eq!(validate_resample_fraction(1.5), Ok(1.5));
        assert!(validate_initial_value(f64::NAN).is_err());
        assert_eq!(validate_initial_value(-3.0), Ok(-3.0));
    }

    #[test]
    // Purpose
    // -------
    // Verify that the tolerance error records the step it belongs to.
    //
    // Given
    // -----
    // - A negative tolerance at step 7.
    //
    // Expect
    // ------
    // - `InvalidTolerance { index: 7, value: -1.0 }`.
    fn tolerance_error_carries_step_index() {
        // Act
        let err = validate_tolerance(7, -1.0).unwrap_err();

        // Assert
        assert_eq!(err, FilterError::InvalidTolerance { index: 7, value: -1.0 });
    }

    #[test]
    // Purpose
    // -------
    // Verify observation checks for length and finiteness.
    //
    // Given
    // -----
    // - A series of length 3 checked against horizons 4 and 3, and a series
    //   with a NaN at index 1.
    //
    // Expect
    // ------
    // - Length mismatch, then success, then `NonFiniteObservation { t: 1 }`.
    fn observations_checked_for_length_and_finiteness() {
        // Arrange
        let y = array![0.1, -0.2, 0.3];
        let bad = array![0.1, f64::NAN, 0.3];

        // Act + Assert
        assert_eq!(
            validate_observations(y.view(), 4),
            Err(FilterError::ObservationLength { expected: 4, actual: 3 })
        );
        assert!(validate_observations(y.view(), 3).is_ok());
        match validate_observations(bad.view(), 3) {
            Err(FilterError::NonFiniteObservation { t, value }) => {
                assert_eq!(t, 1);
                assert!(value.is_nan());
            }
            other => panic!("expected NonFiniteObservation, got {other:?}"),
        }
    }

    #[test]
    fn model_contract_checks() {
        assert!(validate_model_output("states", 0, 10, 10).is_ok());
        assert_eq!(
            validate_model_output("states", 4, 10, 9),
            Err(FilterError::ModelOutputLength { output: "states", t: 4, expected: 10, actual: 9 })
        );
        assert!(validate_time_index(9, 10).is_ok());
        assert_eq!(
            validate_time_index(10, 10),
            Err(FilterError::TimeIndexOutOfRange { t: 10, horizon: 10 })
        );
        let proxies = array![0.0, 1.0, f64::INFINITY];
        assert_eq!(
            validate_proxies(proxies.view(), 2),
            Err(FilterError::NonFiniteProxy { t: 2, index: 2, value: f64::INFINITY })
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify the weight-vector preconditions used by resampling.
    //
    // Given
    // -----
    // - Empty, negative, all-zero, and valid unnormalized weights.
    //
    // Expect
    // ------
    // - `EmptyWeights`, `InvalidWeight`, `ZeroWeightSum`, and `Ok(())`.
    fn weights_checked_before_resampling() {
        // Arrange
        let empty = ndarray::Array1::<f64>::zeros(0);
        let negative = array![0.5, -0.1, 0.6];
        let zeros = array![0.0, 0.0];
        let valid = array![2.0, 0.0, 1.0];

        // Act + Assert
        assert_eq!(validate_weights(empty.view()), Err(FilterError::EmptyWeights));
        assert_eq!(
            validate_weights(negative.view()),
            Err(FilterError::InvalidWeight { index: 1, value: -0.1 })
        );
        assert_eq!(validate_weights(zeros.view()), Err(FilterError::ZeroWeightSum));
        assert!(validate_weights(valid.view()).is_ok());
    }

    #[test]
    fn theta_must_be_finite() {
        let theta = array![0.2, f64::NEG_INFINITY];
        assert_eq!(
            validate_theta(theta.view()),
            Err(FilterError::InvalidTheta { index: 1, value: f64::NEG_INFINITY })
        );
        assert!(validate_theta(array![0.2, 0.96].view()).is_ok());
    }
}
