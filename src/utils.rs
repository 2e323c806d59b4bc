//! utils — argument conversion helpers for the Python bindings.
//!
//! Everything here is compiled only with the `python-bindings` feature and
//! turns loosely typed Python arguments (arrays, pandas Series, sequences,
//! option keywords) into the validated Rust configuration types.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::loglik_optimizer::traits::{LineSearcher, MLEOptions, Tolerances},
    volatility::{
        core::{
            bands::BandMethod,
            options::{ConfidenceOptions, FitOptions},
        },
        models::ModelSpec,
    },
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
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy an array-like argument into an owned vector; `name` labels errors.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_vec<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>, name: &str,
) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{name} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(slice.to_vec())
}

/// Resolve a model name and its orders or lags into a [`ModelSpec`].
#[cfg(feature = "python-bindings")]
pub fn extract_model_spec(
    model: Option<&str>, p: Option<usize>, q: Option<usize>, lags: Option<Vec<usize>>,
) -> PyResult<ModelSpec> {
    let spec = ModelSpec::from_name(model.unwrap_or("garch"), p.unwrap_or(1), q.unwrap_or(1), lags)?;
    Ok(spec)
}

/// Optimizer options; all-`None` tolerances fall back to the defaults.
#[cfg(feature = "python-bindings")]
pub fn extract_mle_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>, verbose: Option<bool>,
) -> PyResult<MLEOptions> {
    use std::str::FromStr;

    let defaults = MLEOptions::default();
    let tols = if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
        defaults.tols
    } else {
        Tolerances::new(tol_grad, tol_cost, max_iter)?
    };

    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name)?,
        None => defaults.line_searcher,
    };

    let opts = MLEOptions::new(tols, ls, verbose.unwrap_or(false), lbfgs_mem)?;
    Ok(opts)
}

/// Fit options with optional confidence bands.
#[cfg(feature = "python-bindings")]
pub fn extract_fit_options(
    mle_opts: MLEOptions, with_confidence: Option<bool>, stderr_fraction: Option<f64>,
    band_method: Option<&str>, z: Option<f64>,
) -> PyResult<FitOptions> {
    if !with_confidence.unwrap_or(false) {
        return Ok(FitOptions::new(mle_opts, None));
    }

    let defaults = ConfidenceOptions::default();
    let method = match band_method {
        Some(name) => name.parse::<BandMethod>()?,
        None => defaults.method,
    };
    let confidence = ConfidenceOptions::new(
        stderr_fraction.unwrap_or(defaults.stderr_fraction),
        method,
        z.unwrap_or(defaults.z),
    )?;
    Ok(FitOptions::new(mle_opts, Some(confidence)))
}
