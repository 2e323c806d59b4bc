//! evaluation::errors — error type for forecast evaluation.
//!
//! [`EvalError`] covers the ways a forecast/realized comparison can be
//! ill-posed: nothing left after alignment, positional series of different
//! lengths, or an unusable rolling window.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type EvalResult<T> = Result<T, EvalError>;

/// Failures of forecast-vs-realized comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// No observation survives missing-value removal and alignment.
    EmptyAlignment,

    /// Positional alignment needs equal lengths.
    LengthMismatch { forecast: usize, realized: usize },

    /// Rolling windows need at least two observations.
    InvalidWindow { window: usize },
}

impl std::error::Error for EvalError {}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::EmptyAlignment => {
                write!(f, "No overlapping non-missing observations between forecast and realized series.")
            }
            EvalError::LengthMismatch { forecast, realized } => {
                write!(
                    f,
                    "Unlabeled series must have equal length: forecast has {forecast}, realized has {realized}."
                )
            }
            EvalError::InvalidWindow { window } => {
                write!(f, "Invalid rolling window: {window}. Must be at least 2.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<EvalError> for PyErr {
    fn from(err: EvalError) -> PyErr {
        PyValueError::new_err(format!("EvalError: {err}"))
    }
}
