//! core — shared data, recursion state, likelihood, fitting, forecasting
//! and confidence bands for GARCH-family models.
//!
//! Purpose
//! -------
//! Hold everything that does not depend on a particular variant: the
//! return-series container, model orders, the [`VarianceModel`] trait the
//! seven variants implement, and the engine pieces written once against it
//! (Gaussian likelihood, bounded MLE, GARCH forecast, bands).
//!
//! Key behaviors
//! -------------
//! - [`ReturnSeries`] maps missing values to zero shocks and supplies the
//!   population variance used as the recursion seed.
//! - [`VarianceGuard`] enforces `σ²ₜ > 0` and finite at every step, strictly
//!   during optimization and leniently for the reported path.
//! - [`log_likelihood`] and [`VarianceObjective`] evaluate the Gaussian
//!   negative log-likelihood with `0.0` / `+∞` sentinels.
//! - [`estimate`] fits any model through
//!   [`maximize_bounded`](crate::optimization::loglik_optimizer::maximize_bounded).
//! - [`forecast_garch`] and [`confidence_bands`] are standalone tools also
//!   used by fitted results.
//!
//! Invariants & assumptions
//! ------------------------
//! - Series are static and in memory; nothing here mutates its inputs.
//! - No global state: independent fits may run on separate threads.
//!
//! Conventions
//! -----------
//! - Oldest observation at index 0. Orders follow `(p, q)` = (variance lags,
//!   shock lags).
//! - Validation failures are [`VolError`](crate::volatility::errors::VolError);
//!   divergence is a value ([`Divergence`](crate::volatility::errors::Divergence)),
//!   not an error.
pub mod bands;
pub mod data;
pub mod estimation;
pub mod forecasts;
pub mod likelihood;
pub mod options;
pub mod orders;
pub mod results;
pub mod state;
pub mod variance_model;

pub use self::bands::{BOOTSTRAP_LEVEL, BandMethod, DEFAULT_Z, confidence_bands, quantile};
pub use self::data::{ReturnSeries, population_variance};
pub use self::estimation::estimate;
pub use self::forecasts::forecast_garch;
pub use self::likelihood::{VarianceObjective, gaussian_nll, log_likelihood};
pub use self::options::{ConfidenceOptions, DEFAULT_STDERR_FRACTION, FitOptions};
pub use self::orders::{HarchLags, Orders};
pub use self::results::{ConfidenceBands, FitResult};
pub use self::state::{RecursionMode, VarianceGuard, VarianceState};
pub use self::variance_model::VarianceModel;
