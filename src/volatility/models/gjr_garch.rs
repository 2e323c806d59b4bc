//! GJR-GARCH(p, q) — GARCH with a leverage term on negative shocks.
//!
//! ```text
//! σ²ₜ = ω + Σᵢ (αᵢ + γᵢ·𝟙[εₜ₋ᵢ₋₁ < 0])·ε²ₜ₋ᵢ₋₁ + Σⱼ βⱼ·σ²ₜ₋ⱼ₋₁
//! ```
//!
//! Layout `[ω, α₁..α_q, γ₁..γ_q, β₁..β_p]`. Bounds are `(1e-6, 1)` except
//! `γ ∈ (0, 1)`. Seeding follows GARCH (population variance for the first
//! `max(p, q)` entries). Forecasts keep the signed historical shocks in the
//! window so negative ones still carry their `γ` weight; future shocks are
//! zero.
use std::collections::VecDeque;

use ndarray::{Array1, s};

use crate::volatility::{
    core::{
        data::{ReturnSeries, population_variance},
        estimation::estimate,
        forecasts::{check_forecast_variance, push_window, tail_window, weighted_lags},
        likelihood::log_likelihood,
        options::FitOptions,
        orders::Orders,
        results::FitResult,
        state::{RecursionMode, VarianceGuard, VarianceState},
        variance_model::VarianceModel,
    },
    errors::{Divergence, VolResult},
    models::ModelSpec,
};

/// GJR-GARCH(p, q) model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GjrGarch {
    pub orders: Orders,
}

/// Unpacked GJR-GARCH(p, q) parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GjrGarchParams {
    pub omega: f64,
    pub alpha: Vec<f64>,
    pub gamma: Vec<f64>,
    pub beta: Vec<f64>,
}

impl GjrGarch {
    pub fn new(orders: Orders) -> Self {
        Self { orders }
    }
}

impl GjrGarchParams {
    /// News-impact weight of a shock `e` at ARCH lag `i`.
    fn shock_weight(&self, i: usize, e: f64) -> f64 {
        if e < 0.0 { self.alpha[i] + self.gamma[i] } else { self.alpha[i] }
    }
}

impl VarianceModel for GjrGarch {
    type Params = GjrGarchParams;

    fn name(&self) -> String {
        format!("GJR-GARCH{}", self.orders)
    }

    fn param_names(&self) -> Vec<String> {
        let Orders { p, q } = self.orders;
        let mut names = vec!["omega".to_string()];
        names.extend((1..=q).map(|i| format!("alpha_{i}")));
        names.extend((1..=q).map(|i| format!("gamma_{i}")));
        names.extend((1..=p).map(|j| format!("beta_{j}")));
        names
    }

    fn initial_guess(&self) -> Array1<f64> {
        let Orders { p, q } = self.orders;
        let mut x0 = vec![1e-6];
        x0.extend(std::iter::repeat_n(0.05, 2 * q));
        x0.extend(std::iter::repeat_n(0.9 / p as f64, p));
        Array1::from(x0)
    }

    fn bound_pairs(&self) -> Vec<(f64, Option<f64>)> {
        let Orders { p, q } = self.orders;
        let mut bounds = vec![(1e-6, Some(1.0)); 1 + q];
        bounds.extend(std::iter::repeat_n((0.0, Some(1.0)), q));
        bounds.extend(std::iter::repeat_n((1e-6, Some(1.0)), p));
        bounds
    }

    fn unpack(&self, theta: &[f64]) -> VolResult<GjrGarchParams> {
        self.check_params(theta)?;
        let q = self.orders.q;
        Ok(GjrGarchParams {
            omega: theta[0],
            alpha: theta[1..1 + q].to_vec(),
            gamma: theta[1 + q..1 + 2 * q].to_vec(),
            beta: theta[1 + 2 * q..].to_vec(),
        })
    }

    fn seed(&self, _params: &GjrGarchParams, shocks: &Array1<f64>) -> f64 {
        population_variance(shocks)
    }

    fn recurse(
        &self, params: &GjrGarchParams, shocks: &Array1<f64>, mode: RecursionMode,
    ) -> Result<VarianceState, Divergence> {
        let n = shocks.len();
        let seed = self.seed(params, shocks);
        let mut guard = VarianceGuard::new(mode);
        let mut sigma2 = Array1::from_elem(n, seed);
        if n > 0 {
            guard.check(0, seed)?;
        }
        for t in self.orders.burn_in()..n {
            let arch: f64 = (0..self.orders.q)
                .map(|i| {
                    let e = shocks[t - i - 1];
                    params.shock_weight(i, e) * e * e
                })
                .sum();
            let garch: f64 = params.beta.iter().enumerate().map(|(j, b)| b * sigma2[t - j - 1]).sum();
            let value = params.omega + arch + garch;
            guard.check(t, value)?;
            sigma2[t] = value;
        }
        Ok(guard.finish(sigma2, shocks.clone(), None))
    }

    fn forecast(
        &self, params: &GjrGarchParams, state: &VarianceState, steps: usize,
    ) -> VolResult<Array1<f64>> {
        let Orders { p, q } = self.orders;
        let n = state.len();
        let mut shocks: VecDeque<f64> = state.residuals.slice(s![n.saturating_sub(q)..]).to_vec().into();
        let mut variances = tail_window(&state.sigma2.to_vec(), p);
        let mut out = Array1::zeros(steps);
        for step in 0..steps {
            let arch: f64 = shocks.iter().rev().enumerate().map(|(i, &e)| params.shock_weight(i, e) * e * e).sum();
            let sigma2 = params.omega + arch + weighted_lags(&params.beta, &variances);
            check_forecast_variance(step, sigma2)?;
            out[step] = sigma2.sqrt();
            push_window(&mut shocks, 0.0, q);
            push_window(&mut variances, sigma2, p);
        }
        Ok(out)
    }

    fn spec(&self) -> ModelSpec {
        ModelSpec::GjrGarch(self.orders)
    }
}

/// Negative log-likelihood cost of a GJR-GARCH(p, q) parameter vector.
///
/// # Errors
/// - `VolError::ParamLengthMismatch` if `params.len() != 1 + 2q + p`.
pub fn gjr_garch_log_likelihood(params: &[f64], returns: &ReturnSeries, orders: Orders) -> VolResult<f64> {
    log_likelihood(&GjrGarch::new(orders), params, returns)
}

/// Fit a GJR-GARCH(p, q) model by maximum likelihood.
pub fn estimate_gjr_garch_params(
    returns: &ReturnSeries, orders: Orders, opts: &FitOptions,
) -> VolResult<FitResult> {
    estimate(&GjrGarch::new(orders), returns, opts)
}
