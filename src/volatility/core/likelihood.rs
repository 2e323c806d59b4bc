//! Gaussian likelihood over one variance recursion.
//!
//! Purpose
//! -------
//! Score a parameter vector against a return series for any
//! [`VarianceModel`], and expose the same score to the optimizer through
//! [`VarianceObjective`].
//!
//! Key behaviors
//! -------------
//! - [`log_likelihood`] returns the negative log-likelihood *cost*
//!   `Σ 0.5·(ln 2π + ln σ²ₜ + εₜ²/σ²ₜ)`.
//! - Order of checks: parameter layout (error), empty series (`0.0`),
//!   strict recursion (divergence → `+∞`), non-finite sum (`+∞`).
//! - [`VarianceObjective`] reports `ℓ = -cost`; a divergent point shows up
//!   as `ℓ = -∞`, which the optimizer adapter penalizes.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every evaluation recomputes the full recursion from scratch; nothing
//!   is cached between calls.
//! - Missing returns enter as zero shocks (see `ReturnSeries::shocks`).
use std::f64::consts::PI;

use ndarray::Array1;

use crate::{
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Cost, LogLikelihood, Theta},
    },
    volatility::{
        core::{data::ReturnSeries, state::RecursionMode, variance_model::VarianceModel},
        errors::VolResult,
    },
};

/// Gaussian negative log-likelihood of `residuals` under `sigma2`.
///
/// Returns `+∞` if the sum is not finite.
pub fn gaussian_nll(sigma2: &Array1<f64>, residuals: &Array1<f64>) -> f64 {
    let ln_2pi = (2.0 * PI).ln();
    let nll: f64 = sigma2
        .iter()
        .zip(residuals.iter())
        .map(|(&s2, &e)| 0.5 * (ln_2pi + s2.ln() + e * e / s2))
        .sum();
    if nll.is_finite() { nll } else { f64::INFINITY }
}

/// Negative log-likelihood cost of `params` on `returns`.
///
/// Parameters
/// ----------
/// - `model`: `&M`
///   Variant and orders defining the parameter layout and recursion.
/// - `params`: `&[f64]`
///   Flat parameter vector in the model's layout.
/// - `returns`: `&ReturnSeries`
///   Returns; `NaN` entries are zero shocks.
///
/// Returns
/// -------
/// `VolResult<f64>`
///   - `Ok(0.0)` for an empty series.
///   - `Ok(+∞)` if the recursion diverges or the sum is non-finite.
///   - `Ok(cost)` otherwise.
///
/// Errors
/// ------
/// - `VolError::ParamLengthMismatch` / `VolError::NonFiniteParam` from
///   `unpack`, raised before the empty-series check.
pub fn log_likelihood<M: VarianceModel>(
    model: &M, params: &[f64], returns: &ReturnSeries,
) -> VolResult<f64> {
    let unpacked = model.unpack(params)?;
    if returns.is_empty() {
        return Ok(0.0);
    }
    let shocks = returns.shocks();
    Ok(nll_from_shocks(model, &unpacked, &shocks))
}

fn nll_from_shocks<M: VarianceModel>(model: &M, params: &M::Params, shocks: &Array1<f64>) -> f64 {
    match model.recurse(params, shocks, RecursionMode::Strict) {
        Ok(state) => gaussian_nll(&state.sigma2, &state.residuals),
        Err(div) => {
            log::trace!("{}: {div}", model.name());
            f64::INFINITY
        }
    }
}

/// Optimizer-facing objective: `ℓ(θ) = -cost(θ)` on a fixed shock series.
///
/// `Data` is the NaN-as-zero shock series so the conversion happens once
/// per fit rather than once per evaluation.
#[derive(Debug)]
pub struct VarianceObjective<'a, M: VarianceModel> {
    pub model: &'a M,
}

impl<'a, M: VarianceModel> VarianceObjective<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self { model }
    }
}

impl<M: VarianceModel> LogLikelihood for VarianceObjective<'_, M> {
    type Data = Array1<f64>;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost> {
        let params = self.model.unpack(&theta.to_vec())?;
        if data.is_empty() {
            return Ok(0.0);
        }
        Ok(-nll_from_shocks(self.model, &params, data))
    }

    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        self.model.check_params(&theta.to_vec())?;
        if let Some(value) = data.iter().find(|v| v.is_infinite()) {
            return Err(OptError::InvalidModelInput {
                text: format!("Returns must be finite or NaN; got: {value}"),
            });
        }
        Ok(())
    }
}
