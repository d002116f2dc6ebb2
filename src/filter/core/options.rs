//! options — run configuration for the ABC particle filter.
//!
//! Purpose
//! -------
//! Collect every knob of a filter run in one validated, immutable value so
//! that the engine never sees raw strings or unchecked numbers. Two layers are
//! provided:
//! - [`FilterSettings`]: the user-facing layer where every field may be unset.
//! - [`FilterOptions`]: the validated configuration produced by
//!   [`FilterSettings::normalize`] (or built directly from typed components).
//!
//! Key behaviors
//! -------------
//! - Unset settings are filled with the defaults below, then every value is
//!   validated. Unknown kernel, resampling, or initial-state names fail here,
//!   before any particle is drawn.
//! - [`ResamplePolicy`] decides at each step whether to resample, from the
//!   ESS of the previous step's weights.
//!
//! Invariants & assumptions
//! ------------------------
//! - A constructed [`FilterOptions`] has `n_particles >= 1`, a validated
//!   tolerance policy, and (if set) a horizon `>= 1`.
//! - The horizon is normally taken from the model. When both are present they
//!   must agree.
//!
//! Conventions
//! -----------
//! - Defaults: `N = 100`, systematic resampling, adaptive resampling with
//!   fraction `0.5`, Gaussian kernel, tolerance `0.10`, initial states drawn
//!   from the model, fixed initial value `0.0`, seed `42`.
//! - `seed = None` on [`FilterOptions`] seeds the RNG from OS entropy.
//!
//! Testing notes
//! -------------
//! - Unit tests cover default filling, each rejection path of `normalize`, the
//!   horizon check, and the adaptive-resampling threshold.
use crate::filter::{
    core::{
        init::InitialState,
        kernels::AbcKernel,
        resampling::ResamplingScheme,
        tolerance::{TolerancePolicy, ToleranceSchedule},
        validation::{validate_horizon, validate_particle_count, validate_resample_fraction},
    },
    errors::{FilterError, FilterResult},
};
use ndarray::Array1;

/// Default number of particles.
pub const DEFAULT_PARTICLES: usize = 100;

/// Default adaptive-resampling fraction of `N`.
pub const DEFAULT_RESAMPLE_FRACTION: f64 = 0.5;

/// Default ABC tolerance.
pub const DEFAULT_TOLERANCE: f64 = 0.10;

/// Default RNG seed.
pub const DEFAULT_SEED: u64 = 42;

/// ResamplePolicy — when the ensemble is resampled.
///
/// Variants
/// --------
/// - `Always`
///   Resample at every step `t > 0`.
/// - `Adaptive { fraction }`
///   Resample at step `t` only if `ESS_{t−1} < N · fraction`. Fractions above
///   one make the test always pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResamplePolicy {
    Always,
    Adaptive { fraction: f64 },
}

impl ResamplePolicy {
    /// Validated adaptive policy.
    ///
    /// Errors
    /// ------
    /// - `FilterError::InvalidResampleFraction` if `fraction` is not finite or `<= 0`.
    pub fn adaptive(fraction: f64) -> FilterResult<Self> {
        Ok(ResamplePolicy::Adaptive { fraction: validate_resample_fraction(fraction)? })
    }

    /// Whether to resample given the ESS of the previous step's weights.
    pub fn should_resample(&self, previous_ess: f64, n_particles: usize) -> bool {
        match self {
            ResamplePolicy::Always => true,
            ResamplePolicy::Adaptive { fraction } => previous_ess < n_particles as f64 * fraction,
        }
    }
}

/// FilterOptions — validated configuration for one or more filter runs.
///
/// Fields
/// ------
/// - `n_particles`: ensemble size `N >= 1`.
/// - `horizon`: optional `T`; `None` takes the model's horizon.
/// - `resampling`: resampling scheme.
/// - `resample_policy`: always or ESS-triggered resampling.
/// - `kernel`: ABC weighting kernel.
/// - `tolerance`: constant tolerance or explicit per-step schedule.
/// - `initial_state`: draw from the model or start at a fixed value.
/// - `seed`: `Some(seed)` for reproducible runs; `None` for OS entropy.
///
/// Notes
/// -----
/// - The same options value can drive many runs (e.g. one per parameter
///   vector); it is never mutated by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    pub n_particles: usize,
    pub horizon: Option<usize>,
    pub resampling: ResamplingScheme,
    pub resample_policy: ResamplePolicy,
    pub kernel: AbcKernel,
    pub tolerance: TolerancePolicy,
    pub initial_state: InitialState,
    pub seed: Option<u64>,
}

impl FilterOptions {
    /// Construct options from already-validated components.
    ///
    /// Errors
    /// ------
    /// - `FilterError::InvalidParticleCount` if `n_particles == 0`.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use abc_smc::filter::core::{
    /// #     init::InitialState, kernels::AbcKernel, options::{FilterOptions, ResamplePolicy},
    /// #     resampling::ResamplingScheme, tolerance::TolerancePolicy,
    /// # };
    /// let opts = FilterOptions::new(
    ///     500,
    ///     ResamplingScheme::Stratified,
    ///     ResamplePolicy::Always,
    ///     AbcKernel::Boxcar,
    ///     TolerancePolicy::constant(0.25).unwrap(),
    ///     InitialState::from_model(),
    ///     Some(7),
    /// )
    /// .unwrap();
    /// assert_eq!(opts.n_particles, 500);
    /// assert!(opts.horizon.is_none());
    /// ```
    pub fn new(
        n_particles: usize, resampling: ResamplingScheme, resample_policy: ResamplePolicy,
        kernel: AbcKernel, tolerance: TolerancePolicy, initial_state: InitialState,
        seed: Option<u64>,
    ) -> FilterResult<Self> {
        Ok(FilterOptions {
            n_particles: validate_particle_count(n_particles)?,
            horizon: None,
            resampling,
            resample_policy,
            kernel,
            tolerance,
            initial_state,
            seed,
        })
    }

    /// Pin the horizon instead of taking it from the model.
    pub fn with_horizon(mut self, horizon: usize) -> FilterResult<Self> {
        self.horizon = Some(validate_horizon(horizon)?);
        Ok(self)
    }

    /// Replace the seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Horizon for a run against a model reporting `model_horizon`.
    ///
    /// Errors
    /// ------
    /// - `FilterError::InvalidHorizon` if the model reports zero steps.
    /// - `FilterError::HorizonMismatch` if a pinned horizon differs from the model's.
    pub fn resolve_horizon(&self, model_horizon: usize) -> FilterResult<usize> {
        let model_horizon = validate_horizon(model_horizon)?;
        match self.horizon {
            Some(configured) if configured != model_horizon => {
                Err(FilterError::HorizonMismatch { configured, model: model_horizon })
            }
            _ => Ok(model_horizon),
        }
    }

    /// Tolerance schedule for a run of `horizon` steps.
    pub fn tolerance_schedule(&self, horizon: usize) -> FilterResult<ToleranceSchedule> {
        self.tolerance.schedule(horizon)
    }
}

impl Default for FilterOptions {
    /// Default options; see the module-level conventions for the values.
    fn default() -> Self {
        FilterOptions {
            n_particles: DEFAULT_PARTICLES,
            horizon: None,
            resampling: ResamplingScheme::Systematic,
            resample_policy: ResamplePolicy::Adaptive { fraction: DEFAULT_RESAMPLE_FRACTION },
            kernel: AbcKernel::Gaussian,
            tolerance: TolerancePolicy::Constant(DEFAULT_TOLERANCE),
            initial_state: InitialState::FromModel,
            seed: Some(DEFAULT_SEED),
        }
    }
}

/// FilterSettings — user-facing settings where every field may be unset.
///
/// Fields
/// ------
/// - `n_particles`, `horizon`: sizes; `horizon` unset defers to the model.
/// - `resampling`: `"stratified"`, `"systematic"`, or `"multinomial"`.
/// - `adaptive_resampling`, `resample_fraction`: ESS-triggered resampling.
/// - `kernel`: `"boxcar"`, `"gaussian"`, or `"qcauchy"`.
/// - `tolerance`: scalar tolerance broadcast to every step.
/// - `tolerance_schedule`: explicit per-step tolerances; takes precedence over
///   `tolerance` when both are set.
/// - `initial_state`: `"model"` or `"fixed"`.
/// - `fixed_initial_value`: start value used when `initial_state = "fixed"`.
/// - `seed`: RNG seed; unset means [`DEFAULT_SEED`].
/// - `entropy_seed`: when `true`, ignore `seed` and seed from OS entropy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSettings {
    pub n_particles: Option<usize>,
    pub horizon: Option<usize>,
    pub resampling: Option<String>,
    pub adaptive_resampling: Option<bool>,
    pub resample_fraction: Option<f64>,
    pub kernel: Option<String>,
    pub tolerance: Option<f64>,
    pub tolerance_schedule: Option<Vec<f64>>,
    pub initial_state: Option<String>,
    pub fixed_initial_value: Option<f64>,
    pub seed: Option<u64>,
    pub entropy_seed: Option<bool>,
}

impl FilterSettings {
    /// Fill unset fields with defaults and validate the result.
    ///
    /// Errors
    /// ------
    /// - `InvalidParticleCount`, `InvalidHorizon` for zero sizes.
    /// - `InvalidResampling`, `InvalidKernel`, `InvalidInitialPolicy` for
    ///   unknown names.
    /// - `InvalidResampleFraction`, `InvalidTolerance`,
    ///   `EmptyToleranceSchedule`, `InvalidInitialValue` for bad numbers.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use abc_smc::filter::core::options::FilterSettings;
    /// # use abc_smc::filter::core::kernels::AbcKernel;
    /// let settings = FilterSettings {
    ///     n_particles: Some(2000),
    ///     kernel: Some("boxcar".to_string()),
    ///     ..Default::default()
    /// };
    /// let opts = settings.normalize().unwrap();
    /// assert_eq!(opts.n_particles, 2000);
    /// assert_eq!(opts.kernel, AbcKernel::Boxcar);
    /// assert_eq!(opts.seed, Some(42));
    /// ```
    pub fn normalize(&self) -> FilterResult<FilterOptions> {
        let n_particles = validate_particle_count(self.n_particles.unwrap_or(DEFAULT_PARTICLES))?;
        let horizon = self.horizon.map(validate_horizon).transpose()?;

        let resampling = match &self.resampling {
            Some(name) => name.parse::<ResamplingScheme>()?,
            None => ResamplingScheme::Systematic,
        };
        let fraction =
            validate_resample_fraction(self.resample_fraction.unwrap_or(DEFAULT_RESAMPLE_FRACTION))?;
        let resample_policy = if self.adaptive_resampling.unwrap_or(true) {
            ResamplePolicy::Adaptive { fraction }
        } else {
            ResamplePolicy::Always
        };

        let kernel = match &self.kernel {
            Some(name) => name.parse::<AbcKernel>()?,
            None => AbcKernel::Gaussian,
        };
        let tolerance = match &self.tolerance_schedule {
            Some(values) => TolerancePolicy::Schedule(ToleranceSchedule::from_values(
                Array1::from_vec(values.clone()),
            )?),
            None => TolerancePolicy::constant(self.tolerance.unwrap_or(DEFAULT_TOLERANCE))?,
        };

        let initial_state = match &self.initial_state {
            Some(name) => match name.parse::<InitialState>()? {
                InitialState::Fixed(_) => {
                    InitialState::fixed(self.fixed_initial_value.unwrap_or(0.0))?
                }
                from_model => from_model,
            },
            None => InitialState::FromModel,
        };

        let seed = if self.entropy_seed.unwrap_or(false) {
            None
        } else {
            Some(self.seed.unwrap_or(DEFAULT_SEED))
        };

        Ok(FilterOptions {
            n_particles,
            horizon,
            resampling,
            resample_policy,
            kernel,
            tolerance,
            initial_state,
            seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify that empty settings normalize to the documented defaults.
    //
    // Given
    // -----
    // - `FilterSettings::default()` with every field unset.
    //
    // Expect
    // ------
    // - The result equals `FilterOptions::default()`.
    fn empty_settings_normalize_to_defaults() {
        // Act
        let opts = FilterSettings::default().normalize().unwrap();

        // Assert
        assert_eq!(opts, FilterOptions::default());
        assert_eq!(opts.n_particles, 100);
        assert_eq!(opts.resampling, ResamplingScheme::Systematic);
        assert_eq!(opts.resample_policy, ResamplePolicy::Adaptive { fraction: 0.5 });
        assert_eq!(opts.kernel, AbcKernel::Gaussian);
        assert_eq!(opts.tolerance, TolerancePolicy::Constant(0.10));
        assert_eq!(opts.seed, Some(42));
    }

    #[test]
    // Purpose
    // -------
    // Verify that explicit settings override every default.
    //
    // Given
    // -----
    // - Settings naming every field, including a fixed initial state and an
    //   explicit tolerance schedule alongside a scalar tolerance.
    //
    // Expect
    // ------
    // - Each field is carried through; the schedule wins over the scalar.
    fn explicit_settings_are_carried_through() {
        // Arrange
        let settings = FilterSettings {
            n_particles: Some(250),
            horizon: Some(3),
            resampling: Some("Multinomial".into()),
            adaptive_resampling: Some(false),
            resample_fraction: None,
            kernel: Some("boxcar".into()),
            tolerance: Some(0.9),
            tolerance_schedule: Some(vec![0.3, 0.2, 0.1]),
            initial_state: Some("fixed".into()),
            fixed_initial_value: Some(-1.5),
            seed: Some(9),
            entropy_seed: None,
        };

        // Act
        let opts = settings.normalize().unwrap();

        // Assert
        assert_eq!(opts.n_particles, 250);
        assert_eq!(opts.horizon, Some(3));
        assert_eq!(opts.resampling, ResamplingScheme::Multinomial);
        assert_eq!(opts.resample_policy, ResamplePolicy::Always);
        assert_eq!(opts.kernel, AbcKernel::Boxcar);
        assert_eq!(opts.tolerance_schedule(3).unwrap().at(2), 0.1);
        assert_eq!(opts.initial_state, InitialState::Fixed(-1.5));
        assert_eq!(opts.seed, Some(9));
    }

    #[test]
    // Purpose
    // -------
    // Verify that invalid settings fail during normalization.
    //
    // Given
    // -----
    // - One bad field at a time on otherwise default settings.
    //
    // Expect
    // ------
    // - The matching configuration error for each.
    fn invalid_settings_are_rejected() {
        let bad = |f: fn(&mut FilterSettings)| {
            let mut s = FilterSettings::default();
            f(&mut s);
            s.normalize().unwrap_err()
        };

        assert_eq!(
            bad(|s| s.n_particles = Some(0)),
            FilterError::InvalidParticleCount { n: 0 }
        );
        assert_eq!(bad(|s| s.horizon = Some(0)), FilterError::InvalidHorizon { horizon: 0 });
        assert!(matches!(
            bad(|s| s.resampling = Some("residual".into())),
            FilterError::InvalidResampling { .. }
        ));
        assert!(matches!(
            bad(|s| s.kernel = Some("triangle".into())),
            FilterError::InvalidKernel { .. }
        ));
        assert!(matches!(
            bad(|s| s.initial_state = Some("prior".into())),
            FilterError::InvalidInitialPolicy { .. }
        ));
        assert_eq!(
            bad(|s| s.tolerance = Some(-0.1)),
            FilterError::InvalidTolerance { index: 0, value: -0.1 }
        );
        assert_eq!(
            bad(|s| s.tolerance_schedule = Some(vec![])),
            FilterError::EmptyToleranceSchedule
        );
        assert_eq!(
            bad(|s| s.resample_fraction = Some(0.0)),
            FilterError::InvalidResampleFraction { value: 0.0 }
        );
        assert_eq!(
            bad(|s| {
                s.initial_state = Some("fixed".into());
                s.fixed_initial_value = Some(f64::INFINITY);
            }),
            FilterError::InvalidInitialValue { value: f64::INFINITY }
        );
    }

    #[test]
    fn entropy_seed_clears_seed() {
        let settings = FilterSettings { entropy_seed: Some(true), seed: Some(3), ..Default::default() };
        assert_eq!(settings.normalize().unwrap().seed, None);
    }

    #[test]
    fn horizon_is_checked_against_model() {
        let opts = FilterOptions::default();
        assert_eq!(opts.resolve_horizon(25), Ok(25));
        assert_eq!(opts.resolve_horizon(0), Err(FilterError::InvalidHorizon { horizon: 0 }));
        let pinned = opts.with_horizon(10).unwrap();
        assert_eq!(
            pinned.resolve_horizon(25),
            Err(FilterError::HorizonMismatch { configured: 10, model: 25 })
        );
        assert_eq!(pinned.resolve_horizon(10), Ok(10));
    }

    #[test]
    // Purpose
    // -------
    // Verify the adaptive resampling threshold `ESS < N · fraction`.
    //
    // Given
    // -----
    // - N = 100 and fraction 0.5.
    //
    // Expect
    // ------
    // - ESS 49.9 triggers resampling; ESS 50 and 100 do not.
    // - `Always` resamples regardless of ESS.
    fn adaptive_threshold_is_strict() {
        // Arrange
        let policy = ResamplePolicy::adaptive(0.5).unwrap();

        // Act + Assert
        assert!(policy.should_resample(49.9, 100));
        assert!(!policy.should_resample(50.0, 100));
        assert!(!policy.should_resample(100.0, 100));
        assert!(ResamplePolicy::Always.should_resample(100.0, 100));
        assert!(ResamplePolicy::adaptive(f64::NAN).is_err());
    }
}
