//! Return-series container for GARCH-family volatility models.
//!
//! Purpose
//! -------
//! Hold one static, in-memory series of log-returns together with optional
//! timestamp labels, and provide the two views every variance recursion
//! needs: the shock series with missing values mapped to zero, and the
//! unconditional (population) variance used to seed the recursions.
//!
//! Key behaviors
//! -------------
//! - [`ReturnSeries::new`] accepts any length, including empty, and any
//!   values; `NaN` marks a missing observation.
//! - [`ReturnSeries::with_labels`] attaches `chrono::NaiveDateTime` labels
//!   and validates that their count matches the value count.
//! - [`ReturnSeries::shocks`] replaces every `NaN` by `0.0` without dropping
//!   entries, so the series length is invariant for a whole fit.
//!
//! Invariants & assumptions
//! ------------------------
//! - If labels are present, `labels.len() == values.len()`.
//! - The container is never mutated by fitting or forecasting.
//!
//! Conventions
//! -----------
//! - Oldest observation at index 0, newest at the end.
//! - `sample_variance` uses denominator `n` (population variance) of the
//!   NaN-as-zero series and returns `0.0` for an empty series.
use chrono::NaiveDateTime;
use ndarray::Array1;

use crate::volatility::errors::{VolError, VolResult};

/// Ordered log-returns with optional timestamp labels.
///
/// Fields
/// ------
/// - `values`: `Array1<f64>`
///   Raw returns; `NaN` denotes a missing observation.
/// - `labels`: `Option<Vec<NaiveDateTime>>`
///   Optional timestamps aligned with `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    pub values: Array1<f64>,
    pub labels: Option<Vec<NaiveDateTime>>,
}

impl ReturnSeries {
    /// Unlabeled series.
    pub fn new(values: Array1<f64>) -> Self {
        Self { values, labels: None }
    }

    /// Labeled series.
    ///
    /// # Errors
    /// - [`VolError::LabelLengthMismatch`] if the label count differs from
    ///   the value count.
    pub fn with_labels(values: Array1<f64>, labels: Vec<NaiveDateTime>) -> VolResult<Self> {
        if labels.len() != values.len() {
            return Err(VolError::LabelLengthMismatch {
                values: values.len(),
                labels: labels.len(),
            });
        }
        Ok(Self { values, labels: Some(labels) })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Shock series with `NaN` replaced by `0.0`.
    pub fn shocks(&self) -> Array1<f64> {
        self.values.mapv(|v| if v.is_nan() { 0.0 } else { v })
    }

    /// Population variance of [`shocks`](Self::shocks).
    pub fn sample_variance(&self) -> f64 {
        population_variance(&self.shocks())
    }
}

impl From<Array1<f64>> for ReturnSeries {
    fn from(values: Array1<f64>) -> Self {
        Self::new(values)
    }
}

impl From<Vec<f64>> for ReturnSeries {
    fn from(values: Vec<f64>) -> Self {
        Self::new(Array1::from(values))
    }
}

/// Population variance (denominator `n`); `0.0` for an empty slice.
pub fn population_variance(x: &Array1<f64>) -> f64 {
    let n = x.len();
    if n == 0 {
        return 0.0;
    }
    let mean = x.sum() / n as f64;
    x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64
}
