//! evaluation — forecast-vs-realized comparison for volatility forecasts.
//!
//! Purpose
//! -------
//! Score a volatility forecast against a realized proxy once both are
//! available: alignment by label or position, MAE/RMSE, and a trailing
//! correlation.
//!
//! Key behaviors
//! -------------
//! - [`align`] pairs non-missing observations.
//! - [`forecast_accuracy`] returns an [`AccuracyReport`].
//! - [`rolling_correlation`] tracks co-movement over trailing windows.
//! - Failures are reported as [`EvalError`] / [`EvalResult`].
//!
//! Downstream usage
//! ----------------
//! - Wrap the fitted or forecast volatility and the realized series in
//!   [`ReturnSeries`](crate::volatility::ReturnSeries) (with labels when
//!   the dates matter) and call [`forecast_accuracy`].

pub mod errors;
pub mod metrics;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{EvalError, EvalResult};
pub use self::metrics::{AccuracyReport, AlignedPair, align, forecast_accuracy, rolling_correlation};
