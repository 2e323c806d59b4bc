//! statistical_tests::validation — shared input guards for test statistics.
//!
//! Purpose
//! -------
//! Centralize the shape and finiteness checks run before any
//! autocorrelation-based statistic, so every diagnostic rejects the same
//! inputs with the same [`LBError`] variants.
//!
//! Invariants & assumptions
//! ------------------------
//! - Series must have length at least 2.
//! - All values must be finite.
//! - The lag count must satisfy `1 ≤ lag < n`.
//!
//! Conventions
//! -----------
//! - Pure validation: no I/O and no allocation beyond the error value.
//! - Degenerate-variance checks belong to the statistic itself, since they
//!   depend on the centred data.

use crate::statistical_tests::errors::{LBError, LBResult};

/// Validate basic input constraints for lag-based test routines.
///
/// Parameters
/// ----------
/// - `data`: `&[f64]`
///   Input series (typically standardized residuals). Must have length at
///   least 2 and contain only finite values.
/// - `lag`: `usize`
///   Number of autocorrelation lags. Must satisfy `1 ≤ lag < data.len()`.
///
/// Returns
/// -------
/// `LBResult<()>`
///   `Ok(())` when all constraints hold.
///
/// Errors
/// ------
/// - `LBError::InsufficientData` when `data.len() < 2`.
/// - `LBError::InvalidData(value)` for the first non-finite entry.
/// - `LBError::InvalidLag(lag)` when `lag == 0` or `lag >= data.len()`.
///
/// Examples
/// --------
/// ```rust
/// # use rust_volatility::statistical_tests::validation::validate_input;
/// # use rust_volatility::statistical_tests::errors::LBError;
/// let data = vec![0.1_f64, -0.2, 0.3];
///
/// assert!(validate_input(&data, 2).is_ok());
/// assert_eq!(validate_input(&data, 3), Err(LBError::InvalidLag(3)));
/// ```
pub fn validate_input(data: &[f64], lag: usize) -> LBResult<()> {
    if data.len() < 2 {
        return Err(LBError::InsufficientData);
    }

    if let Some(&value) = data.iter().find(|v| !v.is_finite()) {
        return Err(LBError::InvalidData(value));
    }

    if lag == 0 || lag >= data.len() {
        return Err(LBError::InvalidLag(lag));
    }

    Ok(())
}
