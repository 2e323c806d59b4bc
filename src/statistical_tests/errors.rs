//! statistical_tests::errors — error type for residual diagnostics.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias shared by the portmanteau
//! diagnostics in this subtree, together with the conversion to Python
//! exceptions used by the PyO3 bindings.
//!
//! Key behaviors
//! -------------
//! - [`LBResult`] and [`LBError`] are the canonical result and error types
//!   for the Ljung–Box test and its input validation.
//! - Every variant carries a human-readable `Display` message naming the
//!   violated constraint and, where relevant, the offending value.
//! - `From<LBError> for PyErr` maps all variants to `PyValueError`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Diagnostics validate their inputs and return [`LBResult<T>`] instead of
//!   panicking on user-facing invalid data.
//! - Variants are small and cheap to clone.
//!
//! Conventions
//! -----------
//! - Messages are phrased as domain constraints ("1 ≤ lag < n") rather than
//!   implementation details.
//!
//! Testing notes
//! -------------
//! - Unit tests check that each message embeds its payload. The PyO3
//!   conversion is left to Python-level tests.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type LBResult<T> = Result<T, LBError>;

/// LBError — error conditions for the Ljung–Box test.
///
/// Variants
/// --------
/// - `InsufficientData`
///   Fewer than two observations; no lag-1 autocorrelation exists.
/// - `InvalidData(value)`
///   A non-finite observation (`NaN` or ±∞).
/// - `InvalidLag(lag)`
///   The lag count violates `1 ≤ lag < n`.
/// - `ZeroVariance`
///   The demeaned series is identically zero, so autocorrelations are
///   undefined.
#[derive(Debug, Clone, PartialEq)]
pub enum LBError {
    //------ Input validation errors ------
    InsufficientData,
    InvalidData(f64),
    InvalidLag(usize),

    //------ Computation errors ------
    ZeroVariance,
}

impl std::error::Error for LBError {}

impl std::fmt::Display for LBError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LBError::InsufficientData => {
                write!(f, "Need at least 2 observations to compute lag-1 autocorrelation.")
            }
            LBError::InvalidData(value) => {
                write!(f, "Invalid data value: {value}. Must be a finite number.")
            }
            LBError::InvalidLag(lag) => {
                write!(f, "Invalid lag: {lag}. Must satisfy 1 ≤ lag < n (data length).")
            }
            LBError::ZeroVariance => {
                write!(f, "Series has zero variance; autocorrelations are undefined.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<LBError> for PyErr {
    fn from(err: LBError) -> PyErr {
        PyValueError::new_err(format!("LBError: {err}"))
    }
}
