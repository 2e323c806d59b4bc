//! volatility — GARCH-family conditional-variance models: recursions,
//! likelihood, fitting, forecasting and confidence bands.
//!
//! Purpose
//! -------
//! Estimate and forecast the time-varying volatility of a return series
//! with seven conditional-variance models (GARCH, GJR-GARCH, EGARCH,
//! Component-GARCH, GARCH-in-Mean, HARCH and an approximate stochastic
//! volatility model) sharing one Gaussian likelihood and one bounded
//! optimizer.
//!
//! Key behaviors
//! -------------
//! - [`core`] holds the variant-independent engine: [`ReturnSeries`],
//!   [`VarianceModel`], the strict/lenient [`VarianceGuard`], the likelihood,
//!   [`estimate`], [`forecast_garch`] and [`confidence_bands`].
//! - [`models`] implements each variant and the runtime [`ModelSpec`] tag.
//! - [`errors`] defines [`VolError`] / [`VolResult`] and the [`Divergence`]
//!   recursion outcome.
//!
//! Invariants & assumptions
//! ------------------------
//! - Missing returns (`NaN`) are zero shocks; the series length never
//!   changes during a fit.
//! - Every accepted variance is strictly positive and finite; a
//!   divergence costs `+∞` during optimization and flags the reported path
//!   as invalid afterwards.
//! - Fitted parameters always lie inside the variant's box bounds.
//!
//! Conventions
//! -----------
//! - Likelihood functions return the *negative* log-likelihood (a cost);
//!   `FitResult::log_likelihood` reports `ℓ = -cost`.
//! - Forecasts return volatilities (`sqrt` of the projected variance).
//! - Logging goes through the `log` facade; nothing here prints.
//!
//! Downstream usage
//! ----------------
//! - Typical flow: build a [`ReturnSeries`], pick a [`ModelSpec`] (or a
//!   concrete model), call `estimate` with [`FitOptions`], then
//!   `FitResult::forecast` and, for diagnostics,
//!   `FitResult::standardized_residuals` with the Ljung–Box test.
//! - Python bindings call [`ModelSpec::from_name`] and the `ModelSpec`
//!   dispatch methods.
//!
//! Testing notes
//! -------------
//! - Each variant pins its recursion against hand computations; the
//!   integration suite fits every variant to simulated data.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    BandMethod, ConfidenceBands, ConfidenceOptions, FitOptions, FitResult, HarchLags, Orders,
    RecursionMode, ReturnSeries, VarianceGuard, VarianceModel, VarianceState, confidence_bands,
    estimate, forecast_garch, log_likelihood,
};
pub use self::errors::{Divergence, VolError, VolResult};
pub use self::models::{ModelSpec, garch_volatility};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_volatility::volatility::prelude::*;
//
// to import the main volatility surface in a single line.

pub mod prelude {
    pub use super::core::{
        BandMethod, ConfidenceOptions, FitOptions, FitResult, HarchLags, Orders, ReturnSeries,
        VarianceModel, confidence_bands, estimate, forecast_garch,
    };
    pub use super::errors::{VolError, VolResult};
    pub use super::models::{
        ComponentGarch, Egarch, Garch, GarchInMean, GjrGarch, Harch, ModelSpec, StochasticVolatility,
        garch_volatility,
    };
}
