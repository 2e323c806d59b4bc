//! rust_volatility — GARCH-family volatility modeling with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes volatility estimation, forecasting and residual diagnostics to
//! Python via the `_rust_volatility` extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules: `volatility` (variance models,
//!   likelihood, fitting, forecasts, bands), `optimization` (bounded
//!   L-BFGS maximum likelihood), `statistical_tests` (Ljung–Box) and
//!   `evaluation` (forecast-vs-realized metrics).
//! - Define `#[pyclass]`/`#[pyfunction]` wrappers and the `#[pymodule]`
//!   initializer for the `_rust_volatility` extension.
//! - Register the Python submodules (`volatility_models`,
//!   `statistical_tests`) in `sys.modules` so dotted imports work.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner Rust modules; this file performs
//!   only FFI glue, argument conversion and error mapping.
//! - Python inputs are copied into owned Rust buffers before any
//!   computation; `NaN` in return series keeps its "missing" meaning.
//!
//! Conventions
//! -----------
//! - Python-exposed items live under `_rust_volatility.<submodule>` and are
//!   wrapped by thin pure-Python facades in the `rust_volatility` package.
//! - Errors from core Rust code convert to `ValueError` at the PyO3
//!   boundary through the `From<_> for PyErr` impls of each error type.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code depends on the inner modules directly and can ignore
//!   the items guarded by the `python-bindings` feature.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   the integration tests under `tests/`; the bindings are exercised from
//!   Python.

pub mod evaluation;
pub mod optimization;
pub mod statistical_tests;
pub mod utils;
pub mod volatility;

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    statistical_tests::ljung_box::LBOutcome,
    utils::{extract_f64_vec, extract_fit_options, extract_mle_opts, extract_model_spec},
    volatility::{
        core::{
            bands::{BandMethod, DEFAULT_Z, confidence_bands as core_confidence_bands},
            data::ReturnSeries,
            forecasts::forecast_garch as core_forecast_garch,
            results::FitResult,
        },
        models::garch_volatility as core_garch_volatility,
    },
};

/// LjungBox — Python-facing wrapper for the Ljung–Box portmanteau test.
///
/// Purpose
/// -------
/// Run [`LBOutcome::ljung_box`] on an array-like series from Python and
/// expose the statistic, p-value and lag as properties.
///
/// Parameters
/// ----------
/// Constructed from Python via `LjungBox(data, lag=None)`:
/// - `data`: array-like of finite `f64` values, length ≥ 2.
/// - `lag`: `Option<usize>`; defaults to `min(10, n − 1)`.
///
/// Notes
/// -----
/// - Native Rust code should call [`LBOutcome::ljung_box`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_volatility.statistical_tests")]
pub struct LjungBox {
    inner: LBOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl LjungBox {
    #[new]
    #[pyo3(text_signature = "(data, /, lag=None)", signature = (raw_data, lag = None))]
    pub fn ljung_box<'py>(
        py: Python<'py>, raw_data: &Bound<'py, PyAny>, lag: Option<usize>,
    ) -> PyResult<LjungBox> {
        let data = extract_f64_vec(py, raw_data, "data")?;
        let lag = lag.unwrap_or_else(|| data.len().saturating_sub(1).clamp(1, 10));
        let inner = LBOutcome::ljung_box(&data, lag)?;
        Ok(LjungBox { inner })
    }

    /// The Ljung–Box Q statistic.
    #[getter]
    pub fn statistic(&self) -> f64 {
        self.inner.stat()
    }

    /// χ²(lag) p-value of the statistic.
    #[getter]
    pub fn pvalue(&self) -> f64 {
        self.inner.p_value()
    }

    #[getter]
    pub fn lag(&self) -> usize {
        self.inner.lag()
    }

    #[getter]
    pub fn n_obs(&self) -> usize {
        self.inner.n_obs()
    }
}

/// VolatilityFit — fitted volatility model exposed to Python as `FitResult`.
///
/// Purpose
/// -------
/// Present a Rust [`FitResult`] to Python: fitted parameters, the in-sample
/// volatility path, optimizer diagnostics, optional bands, and forecasting
/// from the fitted state.
///
/// Notes
/// -----
/// - Instances are created by `estimate_params`; they are not constructed
///   directly from Python.
/// - Array-valued getters copy into Python lists.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "FitResult", module = "rust_volatility.volatility_models")]
pub struct VolatilityFit {
    pub inner: FitResult,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl VolatilityFit {
    /// Variant name, e.g. `"GARCH(1,1)"`.
    #[getter]
    pub fn model(&self) -> String {
        self.inner.spec.name()
    }

    #[getter]
    pub fn params(&self) -> Vec<f64> {
        self.inner.theta.to_vec()
    }

    #[getter]
    pub fn param_names(&self) -> Vec<String> {
        self.inner.param_names.clone()
    }

    #[getter]
    pub fn volatility(&self) -> Vec<f64> {
        self.inner.volatility.to_vec()
    }

    #[getter]
    pub fn log_likelihood(&self) -> f64 {
        self.inner.log_likelihood()
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.outcome.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.outcome.status.clone()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.outcome.iterations
    }

    #[getter]
    pub fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }

    #[getter]
    pub fn stderr(&self) -> Option<Vec<f64>> {
        self.inner.bands.as_ref().map(|b| b.stderr.to_vec())
    }

    #[getter]
    pub fn lower(&self) -> Option<Vec<f64>> {
        self.inner.bands.as_ref().map(|b| b.lower.to_vec())
    }

    #[getter]
    pub fn upper(&self) -> Option<Vec<f64>> {
        self.inner.bands.as_ref().map(|b| b.upper.to_vec())
    }

    #[getter]
    pub fn conditional_mean(&self) -> Option<Vec<f64>> {
        self.inner.conditional_mean.as_ref().map(|m| m.to_vec())
    }

    pub fn standardized_residuals(&self) -> Vec<f64> {
        self.inner.standardized_residuals().to_vec()
    }

    /// Volatility forecast `steps` ahead from the fitted state.
    #[pyo3(text_signature = "(self, steps, /)")]
    pub fn forecast(&self, steps: usize) -> PyResult<Vec<f64>> {
        Ok(self.inner.forecast(steps)?.to_vec())
    }
}

/// Negative log-likelihood cost of `params` for the named variant.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (params, returns, model = None, p = None, q = None, lags = None),
    text_signature = "(params, returns, /, model='garch', p=1, q=1, lags=None)"
)]
pub fn log_likelihood<'py>(
    py: Python<'py>, params: &Bound<'py, PyAny>, returns: &Bound<'py, PyAny>, model: Option<&str>,
    p: Option<usize>, q: Option<usize>, lags: Option<Vec<usize>>,
) -> PyResult<f64> {
    let spec = extract_model_spec(model, p, q, lags)?;
    let params = extract_f64_vec(py, params, "params")?;
    let series = ReturnSeries::from(extract_f64_vec(py, returns, "returns")?);
    Ok(spec.log_likelihood(&params, &series)?)
}

/// Fit the named variant by maximum likelihood.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (
        returns,
        model = None,
        p = None,
        q = None,
        lags = None,
        with_confidence = None,
        stderr_fraction = None,
        band_method = None,
        z = None,
        tol_grad = None,
        tol_cost = None,
        max_iter = None,
        line_searcher = None,
        lbfgs_mem = None,
        verbose = None,
    ),
    text_signature = "(returns, /, model='garch', p=1, q=1, lags=None, with_confidence=False, \
                      stderr_fraction=0.1, band_method='normal', z=1.96, tol_grad=None, \
                      tol_cost=None, max_iter=None, line_searcher=None, lbfgs_mem=None, \
                      verbose=False)"
)]
pub fn estimate_params<'py>(
    py: Python<'py>, returns: &Bound<'py, PyAny>, model: Option<&str>, p: Option<usize>,
    q: Option<usize>, lags: Option<Vec<usize>>, with_confidence: Option<bool>,
    stderr_fraction: Option<f64>, band_method: Option<&str>, z: Option<f64>,
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>, verbose: Option<bool>,
) -> PyResult<VolatilityFit> {
    let spec = extract_model_spec(model, p, q, lags)?;
    let series = ReturnSeries::from(extract_f64_vec(py, returns, "returns")?);
    let mle_opts = extract_mle_opts(tol_grad, tol_cost, max_iter, line_searcher, lbfgs_mem, verbose)?;
    let opts = extract_fit_options(mle_opts, with_confidence, stderr_fraction, band_method, z)?;
    let inner = spec.estimate(&series, &opts)?;
    Ok(VolatilityFit { inner })
}

/// Multi-step GARCH(p, q) volatility forecast from explicit histories.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    text_signature = "(omega, alpha, beta, last_shocks, last_variances, steps, /)"
)]
pub fn forecast_garch<'py>(
    py: Python<'py>, omega: f64, alpha: &Bound<'py, PyAny>, beta: &Bound<'py, PyAny>,
    last_shocks: &Bound<'py, PyAny>, last_variances: &Bound<'py, PyAny>, steps: usize,
) -> PyResult<Vec<f64>> {
    let alpha = extract_f64_vec(py, alpha, "alpha")?;
    let beta = extract_f64_vec(py, beta, "beta")?;
    let shocks = extract_f64_vec(py, last_shocks, "last_shocks")?;
    let variances = extract_f64_vec(py, last_variances, "last_variances")?;
    Ok(core_forecast_garch(omega, &alpha, &beta, &shocks, &variances, steps)?.to_vec())
}

/// Lower and upper bands around `center`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (center, spread, method = None, z = None),
    text_signature = "(center, spread, /, method='normal', z=1.96)"
)]
pub fn confidence_bands<'py>(
    py: Python<'py>, center: &Bound<'py, PyAny>, spread: &Bound<'py, PyAny>, method: Option<&str>,
    z: Option<f64>,
) -> PyResult<(Vec<f64>, Vec<f64>)> {
    let method = match method {
        Some(name) => name.parse::<BandMethod>()?,
        None => BandMethod::default(),
    };
    let center = Array1::from(extract_f64_vec(py, center, "center")?);
    let spread = Array1::from(extract_f64_vec(py, spread, "spread")?);
    let (lower, upper) = core_confidence_bands(&center, &spread, method, z.unwrap_or(DEFAULT_Z))?;
    Ok((lower.to_vec(), upper.to_vec()))
}

/// GARCH volatility path for fixed coefficients.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (returns, omega, alpha, beta, initial_vol = None),
    text_signature = "(returns, omega, alpha, beta, /, initial_vol=None)"
)]
pub fn garch_volatility<'py>(
    py: Python<'py>, returns: &Bound<'py, PyAny>, omega: f64, alpha: &Bound<'py, PyAny>,
    beta: &Bound<'py, PyAny>, initial_vol: Option<f64>,
) -> PyResult<Vec<f64>> {
    let series = ReturnSeries::from(extract_f64_vec(py, returns, "returns")?);
    let alpha = extract_f64_vec(py, alpha, "alpha")?;
    let beta = extract_f64_vec(py, beta, "beta")?;
    Ok(core_garch_volatility(&series, omega, &alpha, &beta, initial_vol)?.to_vec())
}

/// _rust_volatility — PyO3 module initializer for the Python extension.
///
/// Creates the `volatility_models` and `statistical_tests` submodules,
/// attaches them to the parent module and registers them in `sys.modules`
/// so they are importable via dotted paths.
///
/// Errors
/// ------
/// - `PyErr` if creating submodules or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_volatility<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let volatility_models_mod = PyModule::new(_py, "volatility_models")?;
    let statistical_tests_mod = PyModule::new(_py, "statistical_tests")?;
    volatility_models(_py, m, &volatility_models_mod)?;
    statistical_tests(_py, m, &statistical_tests_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_volatility.volatility_models", volatility_models_mod)?;

    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_volatility.statistical_tests", statistical_tests_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn volatility_models<'py>(
    _py: Python, rust_volatility: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<VolatilityFit>()?;
    m.add_function(wrap_pyfunction!(log_likelihood, m)?)?;
    m.add_function(wrap_pyfunction!(estimate_params, m)?)?;
    m.add_function(wrap_pyfunction!(forecast_garch, m)?)?;
    m.add_function(wrap_pyfunction!(confidence_bands, m)?)?;
    m.add_function(wrap_pyfunction!(garch_volatility, m)?)?;
    rust_volatility.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn statistical_tests<'py>(
    _py: Python, rust_volatility: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<LjungBox>()?;
    rust_volatility.add_submodule(m)?;
    Ok(())
}
