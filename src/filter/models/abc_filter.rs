//! ABC particle filter engine.
//!
//! This module runs sequential importance resampling over a fixed horizon,
//! with an ABC kernel standing in for the observation density. One run
//! produces an estimate of `ln p(y_{0:T−1} | θ)` for the parameters baked into
//! the model, along with the full particle, weight, and ancestry history.
//!
//! Per step `t`:
//! 1. `t = 0`: draw initial states (or set the fixed value).
//! 2. `t > 0`: resample from weight column `t − 1` if the policy fires on
//!    `ess[t − 1]`, otherwise keep the identity map; record the parents as
//!    ancestry column `t`, then propagate the reindexed states with time
//!    index `t − 1`.
//! 3. Simulate proxies at `t` and weigh them against `y_t`.
//! 4. Normalize the weight column, then record the state estimate, ESS, and
//!    log-likelihood increment.
//!
//! After the last step one final slot is drawn from the final weights and its
//! lineage is traced through the parent pointers.
//!
//! A step that rejects every particle contributes `-inf`; its weight column is
//! reset to uniform so the run still completes.
use crate::{
    filter::{
        core::{
            init::InitialState,
            options::{FilterOptions, FilterSettings},
            output::FilterOutput,
            resampling::{draw_index, effective_sample_size},
            validation::{validate_model_output, validate_observations, validate_proxies},
        },
        errors::FilterResult,
        models::traits::StateSpaceModel,
    },
    optimization::numerical_stability::transformations::{normalize_in_place, weighted_mean},
};
use ndarray::{Array1, Array2, ArrayView1};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// ABC particle filter with fixed, validated options.
///
/// The filter holds no per-run state; [`AbcParticleFilter::run`] allocates
/// every array afresh and returns them in a [`FilterOutput`]. One filter can
/// therefore be reused across models (e.g. one per parameter vector).
#[derive(Debug, Clone, PartialEq)]
pub struct AbcParticleFilter {
    options: FilterOptions,
}

impl AbcParticleFilter {
    pub fn new(options: FilterOptions) -> Self {
        AbcParticleFilter { options }
    }

    /// Normalize `settings` and build a filter from the result.
    pub fn from_settings(settings: &FilterSettings) -> FilterResult<Self> {
        Ok(AbcParticleFilter::new(settings.normalize()?))
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Run the filter with an RNG seeded from the configured seed (or OS
    /// entropy when the seed is `None`).
    ///
    /// # Errors
    /// - Configuration: `HorizonMismatch`, `InvalidHorizon`,
    ///   `ToleranceScheduleLength`.
    /// - Inputs: `ObservationLength`, `NonFiniteObservation`.
    /// - Model contract: `ModelOutputLength`, `NonFiniteProxy`, and any error
    ///   returned by the model itself.
    pub fn run<M: StateSpaceModel>(
        &self, model: &M, observations: ArrayView1<f64>,
    ) -> FilterResult<FilterOutput> {
        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.run_with_rng(model, observations, &mut rng)
    }

    /// Run the filter drawing all randomness from `rng`.
    pub fn run_with_rng<M: StateSpaceModel, R: Rng>(
        &self, model: &M, observations: ArrayView1<f64>, rng: &mut R,
    ) -> FilterResult<FilterOutput> {
        let opts = &self.options;
        let horizon = opts.resolve_horizon(model.horizon())?;
        validate_observations(observations, horizon)?;
        let tolerances = opts.tolerance_schedule(horizon)?;
        let n = opts.n_particles;

        let mut particles = Array2::<f64>::zeros((n, horizon));
        let mut weights = Array2::<f64>::zeros((n, horizon));
        let mut ancestors = Array2::<usize>::zeros((n, horizon));
        let mut proxies = Array2::<f64>::zeros((n, horizon));
        let mut auxiliary = [Array2::<f64>::zeros((n, horizon)), Array2::<f64>::zeros((n, horizon))];
        let mut ess = Array1::<f64>::zeros(horizon);
        let mut resampled = vec![false; horizon];
        let mut state_estimates = Array1::<f64>::zeros(horizon);
        let mut loglik_increments = Array1::<f64>::zeros(horizon);
        let mut bandwidths = Array1::<f64>::zeros(horizon);
        let identity: Array1<usize> = (0..n).collect();

        log::debug!(
            "ABC filter start: N={}, T={}, kernel={}, resampling={}, policy={:?}",
            n,
            horizon,
            opts.kernel.name(),
            opts.resampling.name(),
            opts.resample_policy
        );

        for t in 0..horizon {
            if t == 0 {
                let initial = match opts.initial_state {
                    InitialState::FromModel => model.sample_initial(n, rng)?,
                    InitialState::Fixed(value) => Array1::from_elem(n, value),
                };
                validate_model_output("initial states", 0, n, initial.len())?;
                particles.column_mut(0).assign(&initial);
                ancestors.column_mut(0).assign(&identity);
            } else {
                let parents = if opts.resample_policy.should_resample(ess[t - 1], n) {
                    resampled[t] = true;
                    log::debug!("step {t}: resampling (ESS {:.2} of {n})", ess[t - 1]);
                    opts.resampling.resample(weights.column(t - 1), rng)?
                } else {
                    identity.clone()
                };
                let previous: Array1<f64> =
                    parents.iter().map(|&parent| particles[(parent, t - 1)]).collect();
                let next = model.sample_transition(previous.view(), t - 1, rng)?;
                validate_model_output("states", t, n, next.len())?;
                particles.column_mut(t).assign(&next);
                ancestors.column_mut(t).assign(&parents);
            }

            let simulated = model.simulate_observation(particles.column(t), t, rng)?;
            validate_model_output("proxies", t, n, simulated.primary.len())?;
            for aux in &simulated.auxiliary {
                validate_model_output("auxiliary proxies", t, n, aux.len())?;
            }
            validate_proxies(simulated.primary.view(), t)?;
            proxies.column_mut(t).assign(&simulated.primary);
            for (stored, aux) in auxiliary.iter_mut().zip(&simulated.auxiliary) {
                stored.column_mut(t).assign(aux);
            }

            let step = opts.kernel.weigh_into(
                proxies.column(t),
                observations[t],
                tolerances.at(t),
                weights.column_mut(t),
            )?;
            if !normalize_in_place(weights.column_mut(t)) {
                log::warn!("step {t}: every particle rejected; weights reset to uniform");
            }

            state_estimates[t] = weighted_mean(weights.column(t), particles.column(t));
            ess[t] = effective_sample_size(weights.column(t));
            loglik_increments[t] = step.loglik_increment;
            bandwidths[t] = step.bandwidth;

            log::trace!(
                "step {t}: ess={:.3}, loglik_increment={:.6}, bandwidth={:.6e}",
                ess[t],
                step.loglik_increment,
                step.bandwidth
            );
        }

        let loglik = loglik_increments.sum();
        let trajectory_slot = draw_index(weights.column(horizon - 1), rng)?;

        let mut output = FilterOutput {
            particles,
            weights,
            ancestors,
            proxies,
            auxiliary,
            ess,
            resampled,
            state_estimates,
            loglik_increments,
            bandwidths,
            loglik,
            tolerances,
            trajectory_slot,
            trajectory: Array1::zeros(horizon),
        };
        output.trajectory = output.trace_trajectory(trajectory_slot)?;

        log::debug!(
            "ABC filter done: loglik={:.6}, resampled {} of {} steps",
            loglik,
            output.resample_count(),
            horizon
        );
        Ok(output)
    }
}
