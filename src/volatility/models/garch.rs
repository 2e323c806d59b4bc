//! GARCH(p, q) — Bollerslev's generalized ARCH model.
//!
//! Purpose
//! -------
//! Implement the symmetric GARCH(p, q) variance recursion
//!
//! ```text
//! σ²ₜ = ω + Σᵢ αᵢ·ε²ₜ₋ᵢ₋₁ + Σⱼ βⱼ·σ²ₜ₋ⱼ₋₁
//! ```
//!
//! together with its parameter layout, likelihood, fit and forecast, and a
//! standalone volatility filter for user-supplied coefficients.
//!
//! Key behaviors
//! -------------
//! - Layout `[ω, α₁..α_q, β₁..β_p]`; initial guess `(1e-6, 0.05, 0.9/p)`;
//!   every bound `(1e-6, 1)`.
//! - The first `max(p, q)` variances are seeded with the population
//!   variance of the shock series; the seed itself must be positive.
//! - Forecasts delegate to [`forecast_garch`] with the last `q` squared
//!   residuals and the last `p` fitted variances.
//! - [`garch_volatility`] runs the same recursion with an optional initial
//!   volatility seed and fails on the first inadmissible variance.
use ndarray::{Array1, s};

use crate::volatility::{
    core::{
        data::{ReturnSeries, population_variance},
        estimation::estimate,
        forecasts::forecast_garch,
        likelihood::log_likelihood,
        options::FitOptions,
        orders::Orders,
        results::FitResult,
        state::{RecursionMode, VarianceGuard, VarianceState},
        variance_model::VarianceModel,
    },
    errors::{Divergence, VolError, VolResult},
    models::ModelSpec,
};

/// GARCH(p, q) model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Garch {
    pub orders: Orders,
}

/// Unpacked GARCH(p, q) parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GarchParams {
    pub omega: f64,
    pub alpha: Vec<f64>,
    pub beta: Vec<f64>,
}

impl Garch {
    pub fn new(orders: Orders) -> Self {
        Self { orders }
    }
}

impl VarianceModel for Garch {
    type Params = GarchParams;

    fn name(&self) -> String {
        format!("GARCH{}", self.orders)
    }

    fn param_names(&self) -> Vec<String> {
        let mut names = vec!["omega".to_string()];
        names.extend((1..=self.orders.q).map(|i| format!("alpha_{i}")));
        names.extend((1..=self.orders.p).map(|j| format!("beta_{j}")));
        names
    }

    fn initial_guess(&self) -> Array1<f64> {
        let Orders { p, q } = self.orders;
        let mut x0 = vec![1e-6];
        x0.extend(std::iter::repeat_n(0.05, q));
        x0.extend(std::iter::repeat_n(0.9 / p as f64, p));
        Array1::from(x0)
    }

    fn bound_pairs(&self) -> Vec<(f64, Option<f64>)> {
        vec![(1e-6, Some(1.0)); self.n_params()]
    }

    fn unpack(&self, theta: &[f64]) -> VolResult<GarchParams> {
        self.check_params(theta)?;
        let q = self.orders.q;
        Ok(GarchParams { omega: theta[0], alpha: theta[1..1 + q].to_vec(), beta: theta[1 + q..].to_vec() })
    }

    fn seed(&self, _params: &GarchParams, shocks: &Array1<f64>) -> f64 {
        population_variance(shocks)
    }

    fn recurse(
        &self, params: &GarchParams, shocks: &Array1<f64>, mode: RecursionMode,
    ) -> Result<VarianceState, Divergence> {
        let seed = self.seed(params, shocks);
        garch_recursion(params, shocks, seed, mode)
    }

    fn forecast(
        &self, params: &GarchParams, state: &VarianceState, steps: usize,
    ) -> VolResult<Array1<f64>> {
        let (shocks, variances) = garch_history(state, self.orders);
        forecast_garch(params.omega, &params.alpha, &params.beta, &shocks, &variances, steps)
    }

    fn spec(&self) -> ModelSpec {
        ModelSpec::Garch(self.orders)
    }
}

/// Negative log-likelihood cost of a GARCH(p, q) parameter vector.
///
/// # Errors
/// - [`VolError::ParamLengthMismatch`] if `params.len() != 1 + q + p`.
pub fn garch_log_likelihood(params: &[f64], returns: &ReturnSeries, orders: Orders) -> VolResult<f64> {
    log_likelihood(&Garch::new(orders), params, returns)
}

/// Fit a GARCH(p, q) model by maximum likelihood.
///
/// # Errors
/// - See [`estimate`].
pub fn estimate_garch_params(
    returns: &ReturnSeries, orders: Orders, opts: &FitOptions,
) -> VolResult<FitResult> {
    estimate(&Garch::new(orders), returns, opts)
}

/// GARCH volatility path for given coefficients.
///
/// Parameters
/// ----------
/// - `returns`: `&ReturnSeries`
///   Returns; `NaN` entries are zero shocks.
/// - `omega`, `alpha`, `beta`
///   Coefficients; the orders are `q = alpha.len()` and `p = beta.len()`.
/// - `initial_vol`: `Option<f64>`
///   Volatility used to seed the first `max(p, q)` variances (squared).
///   `None` seeds with the population variance of the shocks.
///
/// Returns
/// -------
/// `VolResult<Array1<f64>>`
///   `σₜ` for every observation.
///
/// Errors
/// ------
/// - `VolError::InvalidOrder` if `beta` is empty.
/// - `VolError::NonFiniteParam` for a non-finite coefficient.
/// - `VolError::InvalidInitialVol` if `initial_vol` is not finite and > 0.
/// - `VolError::Diverged` at the first non-positive or non-finite variance
///   (including a zero-variance seed).
pub fn garch_volatility(
    returns: &ReturnSeries, omega: f64, alpha: &[f64], beta: &[f64], initial_vol: Option<f64>,
) -> VolResult<Array1<f64>> {
    let model = Garch::new(Orders::new(beta.len(), alpha.len())?);
    let theta: Vec<f64> = std::iter::once(omega).chain(alpha.iter().copied()).chain(beta.iter().copied()).collect();
    let params = model.unpack(&theta)?;
    let shocks = returns.shocks();
    let seed = match initial_vol {
        Some(v) if v.is_finite() && v > 0.0 => v * v,
        Some(v) => return Err(VolError::InvalidInitialVol { value: v }),
        None => model.seed(&params, &shocks),
    };
    let state = garch_recursion(&params, &shocks, seed, RecursionMode::Strict)?;
    Ok(state.volatility())
}

// ---- Helpers ----

fn garch_recursion(
    params: &GarchParams, shocks: &Array1<f64>, seed: f64, mode: RecursionMode,
) -> Result<VarianceState, Divergence> {
    let n = shocks.len();
    let m = params.alpha.len().max(params.beta.len());
    let mut guard = VarianceGuard::new(mode);
    let mut sigma2 = Array1::from_elem(n, seed);
    if n > 0 {
        guard.check(0, seed)?;
    }
    for t in m..n {
        let arch: f64 = params.alpha.iter().enumerate().map(|(i, a)| a * shocks[t - i - 1].powi(2)).sum();
        let garch: f64 = params.beta.iter().enumerate().map(|(j, b)| b * sigma2[t - j - 1]).sum();
        let value = params.omega + arch + garch;
        guard.check(t, value)?;
        sigma2[t] = value;
    }
    Ok(guard.finish(sigma2, shocks.clone(), None))
}

/// Last `q` squared residuals and last `p` variances of a fitted state.
pub(crate) fn garch_history(state: &VarianceState, orders: Orders) -> (Vec<f64>, Vec<f64>) {
    let n = state.len();
    let shocks = state.residuals.slice(s![n.saturating_sub(orders.q)..]).mapv(|e| e * e).to_vec();
    let variances = state.sigma2.slice(s![n.saturating_sub(orders.p)..]).to_vec();
    (shocks, variances)
}
