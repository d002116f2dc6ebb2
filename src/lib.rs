//! abc_smc — ABC particle filtering for state-space models, with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the ABC particle filter to Python via the `_abc_smc` extension module. When
//! the `python-bindings` feature is enabled, this module defines the
//! Python-facing filter class and the `filters` submodule.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`filter`, `optimization`) as the public
//!   crate surface.
//! - Define the `AbcFilter` `#[pyclass]` wrapper and the `#[pymodule]`
//!   initializer for the `_abc_smc` Python extension.
//! - Register the `filters` submodule under `abc_smc` so that dot-notation
//!   imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in the inner Rust modules; this file
//!   performs only FFI glue, input conversion, and error mapping.
//! - A Python model object is only ever used while the GIL is held, for the
//!   duration of a single `run` call.
//!
//! Conventions
//! -----------
//! - Matrices returned to Python are `(N, T)`: rows are particle slots and
//!   columns are time steps.
//! - Errors from core Rust code are propagated as [`FilterError`] internally
//!   and converted to `ValueError` at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`filter`] and [`optimization`] and can
//!   ignore the PyO3 items guarded by the `python-bindings` feature.
//! - The Python packaging layer imports `_abc_smc.filters.AbcFilter` and may
//!   wrap it in a user-facing API.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   integration tests under `tests/`.

pub mod filter;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1, PyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use rand::{SeedableRng, rngs::StdRng};

#[cfg(feature = "python-bindings")]
use crate::{
    filter::{
        core::{noisy::perturb_observations, output::FilterOutput},
        errors::FilterError,
        models::abc_filter::AbcParticleFilter,
    },
    utils::{PyStateSpaceModel, build_filter_settings, extract_observations},
};

/// AbcFilter — Python-facing wrapper for [`AbcParticleFilter`].
///
/// Purpose
/// -------
/// Configure an ABC particle filter from keyword arguments, run it against a
/// Python model object, and expose the resulting particle system as numpy
/// arrays.
///
/// Parameters
/// ----------
/// Constructed from Python via `AbcFilter(n_particles=100, ...)`; every
/// argument is optional and defaults as documented on
/// [`FilterSettings`](crate::filter::core::options::FilterSettings).
///
/// Fields
/// ------
/// - `inner`: [`AbcParticleFilter`]
///   Validated filter configuration.
/// - `output`: `Option<FilterOutput>`
///   Output of the most recent run, `None` before the first run.
///
/// Notes
/// -----
/// - The Python model must implement `generate_initial_state(n)`,
///   `generate_state(x, t)` and `generate_observation(x, t)`; see
///   [`PyStateSpaceModel`].
#[cfg(feature = "python-bindings")]
#[pyclass(module = "abc_smc.filters", unsendable)]
pub struct AbcFilter {
    inner: AbcParticleFilter,
    output: Option<FilterOutput>,
}

#[cfg(feature = "python-bindings")]
impl AbcFilter {
    fn output(&self) -> PyResult<&FilterOutput> {
        self.output.as_ref().ok_or_else(|| FilterError::NotRun.into())
    }
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl AbcFilter {
    #[new]
    #[pyo3(
        signature = (
            n_particles = None,
            horizon = None,
            resampling = None,
            adaptive_resampling = None,
            resample_fraction = None,
            kernel = None,
            tolerance = None,
            tolerance_schedule = None,
            initial_state = None,
            fixed_initial_value = None,
            seed = None,
            entropy_seed = None,
        ),
        text_signature = "(n_particles=100, horizon=None, resampling='systematic', \
                          adaptive_resampling=True, resample_fraction=0.5, kernel='gaussian', \
                          tolerance=0.1, tolerance_schedule=None, initial_state='model', \
                          fixed_initial_value=None, seed=42, entropy_seed=False)"
    )]
    pub fn new<'py>(
        py: Python<'py>, n_particles: Option<usize>, horizon: Option<usize>,
        resampling: Option<&str>, adaptive_resampling: Option<bool>,
        resample_fraction: Option<f64>, kernel: Option<&str>, tolerance: Option<f64>,
        tolerance_schedule: Option<&Bound<'py, PyAny>>, initial_state: Option<&str>,
        fixed_initial_value: Option<f64>, seed: Option<u64>, entropy_seed: Option<bool>,
    ) -> PyResult<Self> {
        let settings = build_filter_settings(
            py,
            n_particles,
            horizon,
            resampling,
            adaptive_resampling,
            resample_fraction,
            kernel,
            tolerance,
            tolerance_schedule,
            initial_state,
            fixed_initial_value,
            seed,
            entropy_seed,
        )?;
        let inner = AbcParticleFilter::from_settings(&settings)?;
        Ok(AbcFilter { inner, output: None })
    }

    /// Run the filter and return the log-likelihood estimate.
    #[pyo3(signature = (model, observations), text_signature = "(self, model, observations, /)")]
    pub fn run<'py>(
        &mut self, py: Python<'py>, model: &Bound<'py, PyAny>, observations: &Bound<'py, PyAny>,
    ) -> PyResult<f64> {
        let y = extract_observations(py, observations, "observations")?;
        let py_model = PyStateSpaceModel::new(model.clone(), y.len());
        let output = self.inner.run(&py_model, y.view())?;
        let loglik = output.loglik;
        self.output = Some(output);
        Ok(loglik)
    }

    /// Return a noisy-ABC perturbation of `observations`.
    #[pyo3(signature = (observations, seed = None), text_signature = "(self, observations, /, seed=None)")]
    pub fn perturb_observations<'py>(
        &self, py: Python<'py>, observations: &Bound<'py, PyAny>, seed: Option<u64>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let y = extract_observations(py, observations, "observations")?;
        let opts = self.inner.options();
        let schedule = opts.tolerance_schedule(y.len())?;
        let mut rng = match seed.or(opts.seed) {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        let noisy = perturb_observations(y.view(), opts.kernel, &schedule, &mut rng)?;
        Ok(noisy.into_pyarray(py))
    }

    /// Ancestor slot of `slot` at every time step.
    #[pyo3(signature = (slot), text_signature = "(self, slot, /)")]
    pub fn lineage<'py>(&self, py: Python<'py>, slot: usize) -> PyResult<Bound<'py, PyArray1<usize>>> {
        Ok(self.output()?.lineage(slot)?.into_pyarray(py))
    }

    #[getter]
    pub fn loglik(&self) -> PyResult<f64> {
        Ok(self.output()?.loglik)
    }

    #[getter]
    pub fn loglik_increments<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.output()?.loglik_increments.clone().into_pyarray(py))
    }

    #[getter]
    pub fn state_estimates<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.output()?.state_estimates.clone().into_pyarray(py))
    }

    #[getter]
    pub fn ess<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.output()?.ess.clone().into_pyarray(py))
    }

    #[getter]
    pub fn bandwidths<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.output()?.bandwidths.clone().into_pyarray(py))
    }

    #[getter]
    pub fn tolerances<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.output()?.tolerances.values().to_owned().into_pyarray(py))
    }

    #[getter]
    pub fn resampled(&self) -> PyResult<Vec<bool>> {
        Ok(self.output()?.resampled.clone())
    }

    #[getter]
    pub fn trajectory<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        Ok(self.output()?.trajectory.clone().into_pyarray(py))
    }

    #[getter]
    pub fn trajectory_slot(&self) -> PyResult<usize> {
        Ok(self.output()?.trajectory_slot)
    }

    #[getter]
    pub fn particles<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        Ok(self.output()?.particles.clone().into_pyarray(py))
    }

    #[getter]
    pub fn weights<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        Ok(self.output()?.weights.clone().into_pyarray(py))
    }

    #[getter]
    pub fn ancestors<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<usize>>> {
        Ok(self.output()?.ancestors.clone().into_pyarray(py))
    }

    #[getter]
    pub fn proxies<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        Ok(self.output()?.proxies.clone().into_pyarray(py))
    }

    #[getter]
    pub fn auxiliary<'py>(
        &self, py: Python<'py>,
    ) -> PyResult<(Bound<'py, PyArray2<f64>>, Bound<'py, PyArray2<f64>>)> {
        let [first, second] = &self.output()?.auxiliary;
        Ok((first.clone().into_pyarray(py), second.clone().into_pyarray(py)))
    }
}

/// _abc_smc — Python extension module entry point.
///
/// Purpose
/// -------
/// Define the `_abc_smc` Python module and register the `filters` submodule
/// used by the public `abc_smc` package.
///
/// Errors
/// ------
/// - `PyErr`
///   If creating the submodule or manipulating `sys.modules` fails.
///
/// Notes
/// -----
/// - This function is invoked automatically by Python when importing the
///   compiled extension; it is not called directly by user code.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _abc_smc<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let filters_mod = PyModule::new(_py, "filters")?;
    filters(_py, m, &filters_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("abc_smc.filters", filters_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn filters<'py>(
    _py: Python, abc_smc: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<AbcFilter>()?;
    abc_smc.add_submodule(m)?;
    Ok(())
}
