//! evaluation::metrics — forecast-vs-realized accuracy and rolling correlation.
//!
//! Purpose
//! -------
//! Compare a volatility forecast with a realized-volatility proxy: align
//! the two series, summarize the errors with MAE and RMSE, and track their
//! co-movement with a trailing Pearson correlation.
//!
//! Key behaviors
//! -------------
//! - [`align`] drops missing (`NaN`) entries on each side and pairs the
//!   survivors. When both series carry labels, pairing is on the label
//!   intersection in forecast order; otherwise it is positional and a pair
//!   is dropped when either side is missing.
//! - [`forecast_accuracy`] reports `n_obs`, MAE, RMSE and the residuals
//!   `forecast − realized` over the aligned pairs.
//! - [`rolling_correlation`] returns one value per input position; the
//!   first `window − 1` entries and zero-variance windows are `NaN`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are never mutated.
//! - An empty alignment is an error rather than a `NaN` report.
//!
//! Conventions
//! -----------
//! - Labels are `chrono::NaiveDateTime`, as on [`ReturnSeries`].
//! - Residual sign convention: positive means the forecast overshot.
use std::collections::HashMap;

use chrono::NaiveDateTime;
use ndarray::{Array1, ArrayView1, s};

use crate::evaluation::errors::{EvalError, EvalResult};
use crate::volatility::core::data::ReturnSeries;

/// Forecast and realized values paired up by [`align`].
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    /// Shared labels, when both inputs were labeled.
    pub labels: Option<Vec<NaiveDateTime>>,
    pub forecast: Array1<f64>,
    pub realized: Array1<f64>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.forecast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecast.is_empty()
    }
}

/// Error summary of a forecast against realized values.
///
/// Fields
/// ------
/// - `n_obs`: number of aligned pairs.
/// - `mae`: mean absolute error.
/// - `rmse`: root mean squared error.
/// - `residuals`: `forecast − realized` per aligned pair.
/// - `labels`: aligned labels, when available.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyReport {
    pub n_obs: usize,
    pub mae: f64,
    pub rmse: f64,
    pub residuals: Array1<f64>,
    pub labels: Option<Vec<NaiveDateTime>>,
}

/// Pair up non-missing forecast and realized observations.
///
/// # Errors
/// - [`EvalError::LengthMismatch`] for positional alignment of series with
///   different lengths.
pub fn align(forecast: &ReturnSeries, realized: &ReturnSeries) -> EvalResult<AlignedPair> {
    match (&forecast.labels, &realized.labels) {
        (Some(f_labels), Some(r_labels)) => {
            let lookup: HashMap<NaiveDateTime, f64> = r_labels
                .iter()
                .zip(realized.values.iter())
                .filter(|(_, v)| !v.is_nan())
                .map(|(l, v)| (*l, *v))
                .collect();

            let mut labels = Vec::new();
            let mut f = Vec::new();
            let mut r = Vec::new();
            for (label, value) in f_labels.iter().zip(forecast.values.iter()) {
                if value.is_nan() {
                    continue;
                }
                if let Some(matched) = lookup.get(label) {
                    labels.push(*label);
                    f.push(*value);
                    r.push(*matched);
                }
            }
            Ok(AlignedPair { labels: Some(labels), forecast: Array1::from(f), realized: Array1::from(r) })
        }
        _ => {
            if forecast.len() != realized.len() {
                return Err(EvalError::LengthMismatch { forecast: forecast.len(), realized: realized.len() });
            }
            let (f, r): (Vec<f64>, Vec<f64>) = forecast
                .values
                .iter()
                .zip(realized.values.iter())
                .filter(|(f, r)| !f.is_nan() && !r.is_nan())
                .map(|(f, r)| (*f, *r))
                .unzip();
            Ok(AlignedPair { labels: None, forecast: Array1::from(f), realized: Array1::from(r) })
        }
    }
}

/// MAE and RMSE of a forecast against realized values.
///
/// # Errors
/// - [`EvalError::EmptyAlignment`] when no pair survives alignment.
/// - Errors from [`align`].
pub fn forecast_accuracy(forecast: &ReturnSeries, realized: &ReturnSeries) -> EvalResult<AccuracyReport> {
    let pair = align(forecast, realized)?;
    if pair.is_empty() {
        return Err(EvalError::EmptyAlignment);
    }

    let n = pair.len() as f64;
    let residuals = &pair.forecast - &pair.realized;
    let mae = residuals.iter().map(|e| e.abs()).sum::<f64>() / n;
    let rmse = (residuals.iter().map(|e| e * e).sum::<f64>() / n).sqrt();
    log::debug!("forecast accuracy over {} pairs: mae={mae:.6}, rmse={rmse:.6}", pair.len());

    Ok(AccuracyReport { n_obs: pair.len(), mae, rmse, residuals, labels: pair.labels })
}

/// Trailing-window Pearson correlation of two equally long series.
///
/// Entry `t` uses positions `t + 1 − window ..= t`. Entries before a full
/// window, windows containing `NaN` and windows where either side is
/// constant are `NaN`.
///
/// # Errors
/// - [`EvalError::InvalidWindow`] when `window < 2`.
/// - [`EvalError::LengthMismatch`] when the lengths differ.
pub fn rolling_correlation(
    forecast: ArrayView1<f64>, realized: ArrayView1<f64>, window: usize,
) -> EvalResult<Array1<f64>> {
    if window < 2 {
        return Err(EvalError::InvalidWindow { window });
    }
    if forecast.len() != realized.len() {
        return Err(EvalError::LengthMismatch { forecast: forecast.len(), realized: realized.len() });
    }

    let n = forecast.len();
    let mut out = Array1::from_elem(n, f64::NAN);
    for t in window.saturating_sub(1)..n {
        let start = t + 1 - window;
        out[t] = pearson(forecast.slice(s![start..=t]), realized.slice(s![start..=t]));
    }
    Ok(out)
}

/// Pearson correlation; `NaN` for a constant side.
fn pearson(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let n = x.len() as f64;
    let mx = x.sum() / n;
    let my = y.sum() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y.iter()) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return f64::NAN;
    }
    sxy / (sxx * syy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Label-intersection and positional alignment with missing values.
    // - MAE/RMSE against hand computations.
    // - Rolling-correlation warm-up, perfect correlation and constant
    //   windows.
    // -------------------------------------------------------------------------

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d).expect("valid date").and_hms_opt(0, 0, 0).expect("valid time")
    }

    #[test]
    // Purpose
    // -------
    // Labeled series align on the intersection of non-missing labels.
    //
    // Given
    // -----
    // - Forecast on days 1..=4 with day 2 missing; realized on days 2..=5.
    //
    // Expect
    // ------
    // - Pairs for days 3 and 4 only, in forecast order.
    fn align_labeled_series_uses_label_intersection() {
        // Arrange
        let forecast =
            ReturnSeries::with_labels(array![0.1, f64::NAN, 0.3, 0.4], vec![day(1), day(2), day(3), day(4)])
                .expect("matching labels");
        let realized =
            ReturnSeries::with_labels(array![0.25, 0.2, 0.5, 0.6], vec![day(2), day(3), day(4), day(5)])
                .expect("matching labels");

        // Act
        let pair = align(&forecast, &realized).expect("alignment should succeed");

        // Assert
        assert_eq!(pair.labels, Some(vec![day(3), day(4)]));
        assert_eq!(pair.forecast, array![0.3, 0.4]);
        assert_eq!(pair.realized, array![0.2, 0.5]);
    }

    #[test]
    // Purpose
    // -------
    // Positional alignment drops a pair when either side is missing and
    // the report matches hand-computed MAE/RMSE.
    //
    // Given
    // -----
    // - forecast [1, 2, NaN, 4], realized [1.5, 1.0, 3.0, NaN].
    //
    // Expect
    // ------
    // - Residuals [-0.5, 1.0]; MAE 0.75; RMSE sqrt(0.625).
    fn forecast_accuracy_positional_matches_hand_computation() {
        // Arrange
        let forecast = ReturnSeries::from(vec![1.0, 2.0, f64::NAN, 4.0]);
        let realized = ReturnSeries::from(vec![1.5, 1.0, 3.0, f64::NAN]);

        // Act
        let report = forecast_accuracy(&forecast, &realized).expect("accuracy should succeed");

        // Assert
        assert_eq!(report.n_obs, 2);
        assert_eq!(report.residuals, array![-0.5, 1.0]);
        assert_relative_eq!(report.mae, 0.75, epsilon = 1e-12);
        assert_relative_eq!(report.rmse, 0.625f64.sqrt(), epsilon = 1e-12);
        assert!(report.labels.is_none());
    }

    #[test]
    // Purpose
    // -------
    // Nothing to compare is an error, as is a positional length mismatch.
    //
    // Given
    // -----
    // - Disjoint labels; unlabeled series of lengths 2 and 3.
    //
    // Expect
    // ------
    // - `EmptyAlignment` and `LengthMismatch`.
    fn forecast_accuracy_rejects_empty_or_mismatched_inputs() {
        // Arrange
        let a = ReturnSeries::with_labels(array![0.1], vec![day(1)]).expect("matching labels");
        let b = ReturnSeries::with_labels(array![0.1], vec![day(2)]).expect("matching labels");

        // Act & Assert
        assert_eq!(forecast_accuracy(&a, &b), Err(EvalError::EmptyAlignment));
        assert_eq!(
            forecast_accuracy(&ReturnSeries::from(vec![1.0, 2.0]), &ReturnSeries::from(vec![1.0, 2.0, 3.0])),
            Err(EvalError::LengthMismatch { forecast: 2, realized: 3 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Rolling correlation has a NaN warm-up, is 1 for affine co-movement
    // and NaN over constant windows.
    //
    // Given
    // -----
    // - f = [1, 2, 3, 4, 4, 4, 4], r = 2f + 1, window = 3.
    //
    // Expect
    // ------
    // - NaN at 0 and 1; 1.0 at 2..=4; NaN at 6 (constant window).
    fn rolling_correlation_warm_up_and_constant_windows() {
        // Arrange
        let f = array![1.0, 2.0, 3.0, 4.0, 4.0, 4.0, 4.0];
        let r = f.mapv(|v| 2.0 * v + 1.0);

        // Act
        let corr = rolling_correlation(f.view(), r.view(), 3).expect("valid window");

        // Assert
        assert!(corr[0].is_nan() && corr[1].is_nan());
        for t in 2..=4 {
            assert_relative_eq!(corr[t], 1.0, epsilon = 1e-12);
        }
        assert!(corr[6].is_nan());
        assert_eq!(rolling_correlation(f.view(), r.view(), 1), Err(EvalError::InvalidWindow { window: 1 }));
    }
}
