//! Shared maximum-likelihood fitting for every variance model.
//!
//! Purpose
//! -------
//! Turn a [`VarianceModel`] and a return series into a [`FitResult`]: run
//! the bounded optimizer on the Gaussian likelihood, rebuild the fitted
//! path at the estimate and, on request, attach confidence bands.
//!
//! Key behaviors
//! -------------
//! - The optimizer starts from `model.initial_guess()` inside
//!   `model.bounds()`; every evaluation re-runs the strict recursion.
//! - A solver stop counts as converged only if the projected gradient in
//!   parameter space is small, so estimates pinned to a bound by the
//!   free-space reparameterization are refined rather than reported.
//! - The reported path is rebuilt once in lenient mode so a fit whose best
//!   point still diverges keeps its full-length path, flagged through
//!   `FitResult::is_valid`.
//! - Bands are only built for valid fits; an invalid fit logs a warning
//!   and carries `bands = None`.
//!
//! Conventions
//! -----------
//! - Optimizer failures after at least one evaluation are not errors (the
//!   best point is returned with `outcome.converged == false`).
//! - Log output goes through the `log` facade: `debug` for the fit
//!   summary, `warn` for non-converged or invalid fits.
use ndarray::Array1;

use crate::{
    optimization::loglik_optimizer::maximize_bounded,
    volatility::{
        core::{
            bands::confidence_bands,
            data::ReturnSeries,
            likelihood::{VarianceObjective, gaussian_nll},
            options::{ConfidenceOptions, FitOptions},
            results::{ConfidenceBands, FitResult},
            state::RecursionMode,
            variance_model::VarianceModel,
        },
        errors::VolResult,
    },
};

/// Fit `model` to `returns` by maximum likelihood.
///
/// Parameters
/// ----------
/// - `model`: `&M`
///   Variant and orders.
/// - `returns`: `&ReturnSeries`
///   Returns; `NaN` entries are zero shocks.
/// - `opts`: `&FitOptions`
///   Optimizer settings and optional confidence-band settings.
///
/// Returns
/// -------
/// `VolResult<FitResult>`
///   Estimate, fitted path of input length, optimizer diagnostics and
///   optional bands.
///
/// Errors
/// ------
/// - `VolError::Optimizer` for invalid optimizer configuration, infinite
///   returns, or a backend failure before any point was evaluated.
/// - Band validation errors (only reachable with custom options).
pub fn estimate<M: VarianceModel>(
    model: &M, returns: &ReturnSeries, opts: &FitOptions,
) -> VolResult<FitResult> {
    let shocks = returns.shocks();
    let objective = VarianceObjective::new(model);
    let bounds = model.bounds()?;
    let outcome = maximize_bounded(&objective, &model.initial_guess(), &bounds, &shocks, &opts.mle_opts)?;

    let theta = outcome.theta_hat.clone();
    let params = model.unpack(&theta.to_vec())?;
    let state = model.recurse(&params, &shocks, RecursionMode::Lenient)?;
    let cost = match (shocks.is_empty(), state.is_valid()) {
        (true, _) => 0.0,
        (false, true) => gaussian_nll(&state.sigma2, &state.residuals),
        (false, false) => f64::INFINITY,
    };
    let volatility = state.volatility();
    let conditional_mean = model.conditional_mean(&state);

    let mut result = FitResult {
        spec: model.spec(),
        theta,
        param_names: model.param_names(),
        volatility,
        state,
        outcome,
        cost,
        bands: None,
        conditional_mean,
        labels: returns.labels.clone(),
    };

    log::debug!(
        "{} fit: n = {}, cost = {:.6}, converged = {}, status = {}",
        model.name(),
        result.n_obs(),
        result.cost,
        result.outcome.converged,
        result.outcome.status
    );
    if !result.outcome.converged {
        log::warn!("{} optimizer did not converge: {}", model.name(), result.outcome.status);
    }

    if !result.is_valid() {
        log::warn!(
            "{} fitted variance path is not strictly positive and finite{}",
            model.name(),
            result.state.divergence.map(|d| format!(" ({d})")).unwrap_or_default()
        );
        return Ok(result);
    }
    if let Some(conf) = &opts.confidence {
        result.bands = Some(build_bands(&result.volatility, conf)?);
    }
    Ok(result)
}

fn build_bands(volatility: &Array1<f64>, conf: &ConfidenceOptions) -> VolResult<ConfidenceBands> {
    let stderr = volatility.mapv(|v| conf.stderr_fraction * v);
    let (lower, upper) = confidence_bands(volatility, &stderr, conf.method, conf.z)?;
    Ok(ConfidenceBands { stderr, lower, upper })
}
