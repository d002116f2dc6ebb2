//! utils — conversion helpers for the Python bindings.
//!
//! Everything here is compiled only with the `python-bindings` feature. The
//! helpers turn Python inputs into the crate's Rust types (observation
//! arrays, [`FilterSettings`], a [`StateSpaceModel`] backed by a Python
//! object) and leave all validation to the core modules.
#[cfg(feature = "python-bindings")]
use ndarray::{Array1, ArrayView1};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::{PyAny, PyTuple},
};

#[cfg(feature = "python-bindings")]
use rand::Rng;

#[cfg(feature = "python-bindings")]
use crate::filter::{
    core::options::FilterSettings,
    errors::{FilterError, FilterResult},
    models::traits::{ObservationProxies, StateSpaceModel},
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy a Python array-like into an owned `Array1<f64>`.
///
/// `what` names the argument in the error message.
#[cfg(feature = "python-bindings")]
pub fn extract_observations<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>, what: &str,
) -> PyResult<Array1<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{what} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(Array1::from(slice.to_vec()))
}

/// Collect the keyword arguments of `AbcFilter(...)` into [`FilterSettings`].
///
/// Normalization (defaults, name parsing, numeric checks) happens later in
/// [`FilterSettings::normalize`]; this function only converts types.
#[cfg(feature = "python-bindings")]
pub fn build_filter_settings<'py>(
    py: Python<'py>, n_particles: Option<usize>, horizon: Option<usize>,
    resampling: Option<&str>, adaptive_resampling: Option<bool>, resample_fraction: Option<f64>,
    kernel: Option<&str>, tolerance: Option<f64>, tolerance_schedule: Option<&Bound<'py, PyAny>>,
    initial_state: Option<&str>, fixed_initial_value: Option<f64>, seed: Option<u64>,
    entropy_seed: Option<bool>,
) -> PyResult<FilterSettings> {
    let schedule = match tolerance_schedule {
        Some(raw) => Some(extract_observations(py, raw, "tolerance_schedule")?.to_vec()),
        None => None,
    };

    Ok(FilterSettings {
        n_particles,
        horizon,
        resampling: resampling.map(str::to_string),
        adaptive_resampling,
        resample_fraction,
        kernel: kernel.map(str::to_string),
        tolerance,
        tolerance_schedule: schedule,
        initial_state: initial_state.map(str::to_string),
        fixed_initial_value,
        seed,
        entropy_seed,
    })
}

/// PyStateSpaceModel — a [`StateSpaceModel`] implemented by a Python object.
///
/// The object must provide:
/// - `generate_initial_state(n)` returning `n` states;
/// - `generate_state(x, t)` returning next states for states `x` at `t`;
/// - `generate_observation(x, t)` returning either one proxy array or a tuple
///   `(proxies, aux1, aux2)`.
///
/// The Python side draws its own random numbers, so the Rust RNG handed in by
/// the engine is not used and seeding only fixes resampling and kernel draws.
/// Any Python exception becomes [`FilterError::ModelFailure`].
#[cfg(feature = "python-bindings")]
pub struct PyStateSpaceModel<'py> {
    model: Bound<'py, PyAny>,
    horizon: usize,
}

#[cfg(feature = "python-bindings")]
impl<'py> PyStateSpaceModel<'py> {
    pub fn new(model: Bound<'py, PyAny>, horizon: usize) -> Self {
        PyStateSpaceModel { model, horizon }
    }

    fn to_array(&self, value: &Bound<'py, PyAny>, what: &str) -> FilterResult<Array1<f64>> {
        extract_observations(self.model.py(), value, what).map_err(py_failure)
    }
}

#[cfg(feature = "python-bindings")]
fn py_failure(err: PyErr) -> FilterError {
    FilterError::ModelFailure { reason: err.to_string() }
}

#[cfg(feature = "python-bindings")]
impl StateSpaceModel for PyStateSpaceModel<'_> {
    fn horizon(&self) -> usize {
        self.horizon
    }

    fn sample_initial<R: Rng>(&self, n: usize, _rng: &mut R) -> FilterResult<Array1<f64>> {
        let out = self.model.call_method1("generate_initial_state", (n,)).map_err(py_failure)?;
        self.to_array(&out, "generate_initial_state output")
    }

    fn sample_transition<R: Rng>(
        &self, previous: ArrayView1<f64>, t: usize, _rng: &mut R,
    ) -> FilterResult<Array1<f64>> {
        let x = previous.to_owned().into_pyarray(self.model.py());
        let out = self.model.call_method1("generate_state", (x, t)).map_err(py_failure)?;
        self.to_array(&out, "generate_state output")
    }

    fn simulate_observation<R: Rng>(
        &self, states: ArrayView1<f64>, t: usize, _rng: &mut R,
    ) -> FilterResult<ObservationProxies> {
        let x = states.to_owned().into_pyarray(self.model.py());
        let out = self.model.call_method1("generate_observation", (x, t)).map_err(py_failure)?;

        if let Ok(tuple) = out.downcast::<PyTuple>() {
            if tuple.len() != 3 {
                return Err(FilterError::ModelFailure {
                    reason: format!(
                        "generate_observation returned a tuple of length {}; expected 3",
                        tuple.len()
                    ),
                });
            }
            let primary = self.to_array(&tuple.get_item(0).map_err(py_failure)?, "proxies")?;
            let first = self.to_array(&tuple.get_item(1).map_err(py_failure)?, "aux1")?;
            let second = self.to_array(&tuple.get_item(2).map_err(py_failure)?, "aux2")?;
            return Ok(ObservationProxies::with_auxiliary(primary, first, second));
        }

        Ok(ObservationProxies::new(self.to_array(&out, "proxies")?))
    }
}
