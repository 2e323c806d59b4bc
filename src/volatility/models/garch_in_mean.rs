//! GARCH-in-Mean(p, q) — GARCH variance feeding a volatility risk premium
//! into the mean equation.
//!
//! Purpose
//! -------
//! Fit returns `rₜ = μ + λ·σₜ + εₜ` with a GARCH(p, q) variance driven by
//! the mean-adjusted residuals.
//!
//! Key behaviors
//! -------------
//! - Layout `[μ, λ, ω, α₁..α_q, β₁..β_p]`; bounds μ ∈ (−10, 10),
//!   λ ∈ (−5, 5), ω ∈ (1e-6, 10), α, β ∈ (1e-6, 1).
//! - Inside step `t` the residual `εₜ₋₁ = rₜ₋₁ − μ − λ·σₜ₋₁` is computed
//!   from the already-known variance `σ²ₜ₋₁`, then `σ²ₜ` is updated from
//!   the residual history. The last residual `εₙ₋₁` is computed after the
//!   loop.
//! - Residuals at indices below `max(p, q) − 1` are never computed and
//!   stay zero; they enter the likelihood as zero shocks.
//! - The conditional mean `μ + λ·σₜ` is returned as the auxiliary path and
//!   exposed through `FitResult::conditional_mean`.
//! - Forecasts delegate to `forecast_garch` on the mean-adjusted residuals.
use ndarray::Array1;

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
    errors::{Divergence, VolResult},
    models::{ModelSpec, garch::garch_history},
};

/// GARCH-in-Mean(p, q) model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GarchInMean {
    pub orders: Orders,
}

/// Unpacked GARCH-in-Mean(p, q) parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GarchInMeanParams {
    pub mu: f64,
    pub lambda: f64,
    pub omega: f64,
    pub alpha: Vec<f64>,
    pub beta: Vec<f64>,
}

impl GarchInMean {
    pub fn new(orders: Orders) -> Self {
        Self { orders }
    }
}

impl GarchInMeanParams {
    fn residual(&self, r: f64, sigma2: f64) -> f64 {
        r - self.mu - self.lambda * sigma2.sqrt()
    }
}

impl VarianceModel for GarchInMean {
    type Params = GarchInMeanParams;

    fn name(&self) -> String {
        format!("GARCH-in-Mean{}", self.orders)
    }

    fn param_names(&self) -> Vec<String> {
        let Orders { p, q } = self.orders;
        let mut names = vec!["mu".to_string(), "lambda".to_string(), "omega".to_string()];
        names.extend((1..=q).map(|i| format!("alpha_{i}")));
        names.extend((1..=p).map(|j| format!("beta_{j}")));
        names
    }

    fn initial_guess(&self) -> Array1<f64> {
        let Orders { p, q } = self.orders;
        let mut x0 = vec![0.0, 0.0, 1e-6];
        x0.extend(std::iter::repeat_n(0.05, q));
        x0.extend(std::iter::repeat_n(0.9 / p as f64, p));
        Array1::from(x0)
    }

    fn bound_pairs(&self) -> Vec<(f64, Option<f64>)> {
        let Orders { p, q } = self.orders;
        let mut bounds = vec![(-10.0, Some(10.0)), (-5.0, Some(5.0)), (1e-6, Some(10.0))];
        bounds.extend(std::iter::repeat_n((1e-6, Some(1.0)), q + p));
        bounds
    }

    fn unpack(&self, theta: &[f64]) -> VolResult<GarchInMeanParams> {
        self.check_params(theta)?;
        let q = self.orders.q;
        Ok(GarchInMeanParams {
            mu: theta[0],
            lambda: theta[1],
            omega: theta[2],
            alpha: theta[3..3 + q].to_vec(),
            beta: theta[3 + q..].to_vec(),
        })
    }

    fn seed(&self, _params: &GarchInMeanParams, shocks: &Array1<f64>) -> f64 {
        population_variance(shocks)
    }

    fn recurse(
        &self, params: &GarchInMeanParams, returns: &Array1<f64>, mode: RecursionMode,
    ) -> Result<VarianceState, Divergence> {
        let n = returns.len();
        let seed = self.seed(params, returns);
        let mut guard = VarianceGuard::new(mode);
        let mut sigma2 = Array1::from_elem(n, seed);
        let mut eps = Array1::zeros(n);
        if n > 0 {
            guard.check(0, seed)?;
        }
        for t in self.orders.burn_in()..n {
            eps[t - 1] = params.residual(returns[t - 1], sigma2[t - 1]);
            let arch: f64 = params.alpha.iter().enumerate().map(|(i, a)| a * eps[t - i - 1].powi(2)).sum();
            let garch: f64 = params.beta.iter().enumerate().map(|(j, b)| b * sigma2[t - j - 1]).sum();
            let value = params.omega + arch + garch;
            guard.check(t, value)?;
            sigma2[t] = value;
        }
        if n > 0 {
            eps[n - 1] = params.residual(returns[n - 1], sigma2[n - 1]);
        }
        let mean = sigma2.mapv(|s2| params.mu + params.lambda * s2.sqrt());
        Ok(guard.finish(sigma2, eps, Some(mean)))
    }

    fn forecast(
        &self, params: &GarchInMeanParams, state: &VarianceState, steps: usize,
    ) -> VolResult<Array1<f64>> {
        let (shocks, variances) = garch_history(state, self.orders);
        forecast_garch(params.omega, &params.alpha, &params.beta, &shocks, &variances, steps)
    }

    fn spec(&self) -> ModelSpec {
        ModelSpec::GarchInMean(self.orders)
    }

    fn conditional_mean(&self, state: &VarianceState) -> Option<Array1<f64>> {
        state.aux.clone()
    }
}

/// Negative log-likelihood cost of a GARCH-in-Mean(p, q) parameter vector.
///
/// # Errors
/// - `VolError::ParamLengthMismatch` if `params.len() != 3 + q + p`.
pub fn garch_in_mean_log_likelihood(params: &[f64], returns: &ReturnSeries, orders: Orders) -> VolResult<f64> {
    log_likelihood(&GarchInMean::new(orders), params, returns)
}

/// Fit a GARCH-in-Mean(p, q) model by maximum likelihood.
pub fn estimate_garch_in_mean_params(
    returns: &ReturnSeries, orders: Orders, opts: &FitOptions,
) -> VolResult<FitResult> {
    estimate(&GarchInMean::new(orders), returns, opts)
}
