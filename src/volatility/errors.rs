//! Errors for GARCH-family volatility models (model specification, parameter
//! layout, forecasting, confidence bands, and estimation failures).
//!
//! [`VolError`] is the validation error surfaced by every public volatility
//! entry point. [`Divergence`] is deliberately *not* an error: it is the
//! outcome of a variance recursion that left the admissible region, and the
//! likelihood turns it into a `+∞` cost rather than propagating it.
//!
//! ## Conventions
//! - Indices are 0-based (match Rust/NumPy).
//! - Optimizer failures that cannot be recovered are wrapped unchanged in
//!   [`VolError::Optimizer`].
use crate::optimization::errors::OptError;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for volatility operations that may produce [`VolError`].
pub type VolResult<T> = Result<T, VolError>;

/// Unified validation error for volatility modeling.
#[derive(Debug, Clone, PartialEq)]
pub enum VolError {
    // ---- Input/data validation ----
    /// Timestamp labels must match the number of values.
    LabelLengthMismatch { values: usize, labels: usize },

    /// Initial volatility for a standalone filter must be finite and > 0.
    InvalidInitialVol { value: f64 },

    // ---- Model specification ----
    /// Model name is not one of the supported variants.
    UnknownModel { name: String },

    /// GARCH-type orders must have `p >= 1`.
    InvalidOrder { p: usize, q: usize, reason: &'static str },

    /// HARCH lag-sets must be non-empty with strictly positive lags.
    InvalidLags { lags: Vec<usize>, reason: &'static str },

    /// Flat parameter vector does not match the model's layout.
    ParamLengthMismatch { model: String, expected: usize, actual: usize },

    /// A parameter entry is NaN or ±∞.
    NonFiniteParam { index: usize, value: f64 },

    // ---- Variance recursion ----
    /// A variance path that must be strictly positive and finite was not.
    Diverged { index: usize, value: f64 },

    // ---- Forecasting ----
    /// A forecast input (shock or variance history) is non-finite.
    InvalidForecastInput { index: usize, value: f64, reason: &'static str },

    /// Forecast variance at `step` is negative or non-finite.
    InvalidForecastVariance { step: usize, value: f64 },

    // ---- Confidence bands ----
    /// Band method token is not recognized.
    UnknownBandMethod { name: String },

    /// Center and spread series differ in length.
    BandLengthMismatch { center: usize, spread: usize },

    /// Critical value must be finite and >= 0.
    InvalidCriticalValue { z: f64 },

    /// Spread entries must be finite and >= 0.
    InvalidSpread { index: usize, value: f64 },

    /// Standard-error fraction must be finite and >= 0.
    InvalidStderrFraction { value: f64 },

    // ---- Estimation ----
    /// Optimizer error that could not be recovered into a best point.
    Optimizer(OptError),
}

impl std::error::Error for VolError {}

impl std::fmt::Display for VolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input/data validation ----
            VolError::LabelLengthMismatch { values, labels } => {
                write!(f, "Label count ({labels}) does not match value count ({values}).")
            }
            VolError::InvalidInitialVol { value } => {
                write!(f, "Initial volatility must be finite and > 0; got: {value}")
            }
            // ---- Model specification ----
            VolError::UnknownModel { name } => {
                write!(
                    f,
                    "Unknown model '{name}'. Valid options are 'garch', 'gjr_garch', 'egarch', \
                     'component_garch', 'garch_in_mean', 'harch' or 'stochastic_volatility'."
                )
            }
            VolError::InvalidOrder { p, q, reason } => {
                write!(f, "Invalid model order (p = {p}, q = {q}): {reason}")
            }
            VolError::InvalidLags { lags, reason } => {
                write!(f, "Invalid HARCH lag-set {lags:?}: {reason}")
            }
            VolError::ParamLengthMismatch { model, expected, actual } => {
                write!(f, "{model} expects {expected} parameters; got {actual}.")
            }
            VolError::NonFiniteParam { index, value } => {
                write!(f, "Parameter at index {index} is non-finite: {value}")
            }
            // ---- Variance recursion ----
            VolError::Diverged { index, value } => {
                write!(f, "Conditional variance at index {index} is not positive and finite: {value}")
            }
            // ---- Forecasting ----
            VolError::InvalidForecastInput { index, value, reason } => {
                write!(f, "Invalid forecast input at index {index}: {value}. {reason}")
            }
            VolError::InvalidForecastVariance { step, value } => {
                write!(
                    f,
                    "Forecast variance at step {step} is negative or non-finite: {value}. \
                     The supplied parameters are not stationary."
                )
            }
            // ---- Confidence bands ----
            VolError::UnknownBandMethod { name } => {
                write!(
                    f,
                    "Unsupported confidence band method '{name}'. Valid options are case \
                     insensitive 'normal' or 'bootstrap'."
                )
            }
            VolError::BandLengthMismatch { center, spread } => {
                write!(f, "Center length ({center}) does not match spread length ({spread}).")
            }
            VolError::InvalidCriticalValue { z } => {
                write!(f, "Critical value must be finite and >= 0; got: {z}")
            }
            VolError::InvalidSpread { index, value } => {
                write!(f, "Spread at index {index} must be finite and >= 0; got: {value}")
            }
            VolError::InvalidStderrFraction { value } => {
                write!(f, "Standard-error fraction must be finite and >= 0; got: {value}")
            }
            // ---- Estimation ----
            VolError::Optimizer(err) => {
                write!(f, "Optimization failed: {err}")
            }
        }
    }
}

impl From<OptError> for VolError {
    fn from(err: OptError) -> Self {
        VolError::Optimizer(err)
    }
}

impl From<Divergence> for VolError {
    fn from(div: Divergence) -> Self {
        VolError::Diverged { index: div.index, value: div.value }
    }
}

#[cfg(feature = "python-bindings")]
impl From<VolError> for PyErr {
    fn from(err: VolError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// First index at which a variance recursion left the admissible region.
///
/// `value` is the offending variance (or log-variance for EGARCH after
/// exponentiation): zero, negative, `NaN` or `±∞`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Divergence {
    pub index: usize,
    pub value: f64,
}

impl std::fmt::Display for Divergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "variance diverged at index {}: {}", self.index, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Conversions from `OptError` and `Divergence`.
    // - Display messages that callers match on in bindings.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A divergence converts into `Diverged` with the same index and value.
    //
    // Given
    // -----
    // - `Divergence { index: 4, value: -0.5 }`.
    //
    // Expect
    // ------
    // - `VolError::Diverged { index: 4, value: -0.5 }`.
    fn divergence_converts_into_diverged() {
        // Arrange
        let div = Divergence { index: 4, value: -0.5 };

        // Act
        let err = VolError::from(div);

        // Assert
        assert_eq!(err, VolError::Diverged { index: 4, value: -0.5 });
    }

    #[test]
    // Purpose
    // -------
    // The parameter-length message names the model and both counts.
    //
    // Given
    // -----
    // - A GJR-GARCH(1,1) mismatch with 5 expected and 3 supplied.
    //
    // Expect
    // ------
    // - The message contains the model name, "5" and "3".
    fn param_length_mismatch_message_names_model_and_counts() {
        // Arrange
        let err = VolError::ParamLengthMismatch {
            model: "GJR-GARCH(1,1)".to_string(),
            expected: 5,
            actual: 3,
        };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("GJR-GARCH(1,1)"));
        assert!(msg.contains('5') && msg.contains('3'));
    }

    #[test]
    // Purpose
    // -------
    // Optimizer errors are wrapped unchanged.
    //
    // Given
    // -----
    // - `OptError::MissingThetaHat`.
    //
    // Expect
    // ------
    // - `VolError::Optimizer(OptError::MissingThetaHat)`.
    fn opt_error_is_wrapped() {
        assert_eq!(
            VolError::from(OptError::MissingThetaHat),
            VolError::Optimizer(OptError::MissingThetaHat)
        );
    }
}
