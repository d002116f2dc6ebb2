//! noisy — one-shot kernel perturbation of the observation series.
//!
//! Purpose
//! -------
//! Turn a plain ABC likelihood estimate into a *noisy ABC* estimate by
//! perturbing the observations once with noise drawn from the weighting
//! kernel. Filtering the perturbed series with the same kernel and tolerance
//! then targets the exact likelihood of the perturbed data.
//!
//! Key behaviors
//! -------------
//! - Boxcar: add `U(−ε_t, ε_t)` noise at each step.
//! - Gaussian: add `N(0, ε_t²)` noise at each step.
//! - Quasi-Cauchy: rejected with `FilterError::NoisyAbcUnsupported`; its width
//!   is estimated per step from the proxies, so there is no fixed noise scale.
//!
//! Invariants & assumptions
//! ------------------------
//! - The schedule length must equal the observation length.
//! - The input series is left untouched; a perturbed copy is returned.
//!
//! Downstream usage
//! ----------------
//! - Perturb once per dataset (and per tolerance level), then reuse the
//!   perturbed series for every likelihood evaluation of the outer search.
use crate::filter::{
    core::{kernels::AbcKernel, tolerance::ToleranceSchedule},
    errors::{FilterError, FilterResult},
};
use ndarray::{Array1, ArrayView1};
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

/// Perturb `observations` with noise from `kernel` scaled by `schedule`.
///
/// Errors
/// ------
/// - `FilterError::NoisyAbcUnsupported` for the quasi-Cauchy kernel.
/// - `FilterError::ToleranceScheduleLength` when `schedule.len()` differs from
///   `observations.len()`.
/// - `FilterError::InvalidTolerance` if a noise distribution cannot be built
///   from a schedule entry.
pub fn perturb_observations<R: Rng>(
    observations: ArrayView1<f64>, kernel: AbcKernel, schedule: &ToleranceSchedule, rng: &mut R,
) -> FilterResult<Array1<f64>> {
    if !kernel.uses_tolerance() {
        return Err(FilterError::NoisyAbcUnsupported { kernel: kernel.name() });
    }
    if schedule.len() != observations.len() {
        return Err(FilterError::ToleranceScheduleLength {
            expected: observations.len(),
            actual: schedule.len(),
        });
    }

    let mut perturbed = observations.to_owned();
    for (t, y) in perturbed.iter_mut().enumerate() {
        let eps = schedule.at(t);
        let invalid = FilterError::InvalidTolerance { index: t, value: eps };
        let noise = match kernel {
            AbcKernel::Boxcar => Uniform::new(-eps, eps).map_err(|_| invalid)?.sample(rng),
            AbcKernel::Gaussian => Normal::new(0.0, eps).map_err(|_| invalid)?.sample(rng),
            AbcKernel::QuasiCauchy => {
                return Err(FilterError::NoisyAbcUnsupported { kernel: kernel.name() });
            }
        };
        *y += noise;
    }
    Ok(perturbed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    // Purpose
    // -------
    // Verify that boxcar noise stays inside the per-step half-width.
    //
    // Given
    // -----
    // - 200 zero observations with a schedule alternating 0.1 and 0.5.
    //
    // Expect
    // ------
    // - Every perturbation lies in (−ε_t, ε_t) and not all are zero.
    fn boxcar_noise_is_bounded_by_schedule() {
        // Arrange
        let y = Array1::<f64>::zeros(200);
        let schedule = ToleranceSchedule::from_values(Array1::from_shape_fn(200, |t| {
            if t % 2 == 0 { 0.1 } else { 0.5 }
        }))
        .unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        // Act
        let noisy = perturb_observations(y.view(), AbcKernel::Boxcar, &schedule, &mut rng).unwrap();

        // Assert
        for (t, &v) in noisy.iter().enumerate() {
            assert!(v.abs() < schedule.at(t), "step {t}: {v}");
        }
        assert!(noisy.iter().any(|&v| v != 0.0));
        assert_eq!(y, Array1::<f64>::zeros(200));
    }

    #[test]
    // Purpose
    // -------
    // Verify the scale of Gaussian noise.
    //
    // Given
    // -----
    // - 5_000 zero observations and a constant ε = 0.2.
    //
    // Expect
    // ------
    // - Sample mean near 0 and sample standard deviation near 0.2.
    fn gaussian_noise_has_tolerance_scale() {
        // Arrange
        let n = 5_000;
        let y = Array1::<f64>::zeros(n);
        let schedule = ToleranceSchedule::constant(0.2, n).unwrap();
        let mut rng = StdRng::seed_from_u64(17);

        // Act
        let noisy =
            perturb_observations(y.view(), AbcKernel::Gaussian, &schedule, &mut rng).unwrap();

        // Assert
        let mean = noisy.sum() / n as f64;
        let sd = (noisy.mapv(|v| (v - mean).powi(2)).sum() / n as f64).sqrt();
        assert!(mean.abs() < 0.02, "mean = {mean}");
        assert!((sd - 0.2).abs() < 0.02, "sd = {sd}");
    }

    #[test]
    fn rejects_qcauchy_and_length_mismatch() {
        let y = array![0.1, 0.2, 0.3];
        let mut rng = StdRng::seed_from_u64(1);
        let schedule = ToleranceSchedule::constant(0.1, 3).unwrap();
        assert_eq!(
            perturb_observations(y.view(), AbcKernel::QuasiCauchy, &schedule, &mut rng),
            Err(FilterError::NoisyAbcUnsupported { kernel: "qcauchy" })
        );
        let short = ToleranceSchedule::constant(0.1, 2).unwrap();
        assert_eq!(
            perturb_observations(y.view(), AbcKernel::Gaussian, &short, &mut rng),
            Err(FilterError::ToleranceScheduleLength { expected: 3, actual: 2 })
        );
    }
}
