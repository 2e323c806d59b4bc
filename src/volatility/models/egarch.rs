//! EGARCH(p, q) — Nelson's exponential GARCH.
//!
//! Purpose
//! -------
//! Model the log-variance so positivity holds by construction:
//!
//! ```text
//! zₜ       = εₜ / σₜ
//! ln σ²ₜ   = ω + Σᵢ [αᵢ·(|zₜ₋ᵢ₋₁| − √(2/π)) + γᵢ·zₜ₋ᵢ₋₁] + Σⱼ βⱼ·ln σ²ₜ₋ⱼ₋₁
//! ```
//!
//! Key behaviors
//! -------------
//! - Layout `[ω, α₁..α_q, γ₁..γ_q, β₁..β_p]`; bounds ω ∈ (−10, 10),
//!   α ∈ (1e-6, 1), γ ∈ (−1, 1), β ∈ (1e-6, 1).
//! - The first `max(p, q)` log-variances are seeded with `ln(var)`; a zero
//!   sample variance therefore diverges at index 0.
//! - The guard checks `exp(ln σ²ₜ)`, catching underflow to zero and
//!   overflow to `∞`.
//! - Forecasts keep the historical standardized shocks in the window and
//!   take `z = 0` for future shocks.
use std::collections::VecDeque;
use std::f64::consts::FRAC_2_PI;

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

/// `E|z|` for a standard normal `z`.
fn abs_normal_mean() -> f64 {
    FRAC_2_PI.sqrt()
}

/// EGARCH(p, q) model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Egarch {
    pub orders: Orders,
}

/// Unpacked EGARCH(p, q) parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EgarchParams {
    pub omega: f64,
    pub alpha: Vec<f64>,
    pub gamma: Vec<f64>,
    pub beta: Vec<f64>,
}

impl Egarch {
    pub fn new(orders: Orders) -> Self {
        Self { orders }
    }
}

impl EgarchParams {
    /// `Σᵢ αᵢ(|zᵢ| − √(2/π)) + γᵢzᵢ` over standardized shocks, most recent
    /// first. Missing lags contribute nothing.
    fn news_impact<'a>(&self, z_recent_first: impl Iterator<Item = &'a f64>) -> f64 {
        let c = abs_normal_mean();
        self.alpha
            .iter()
            .zip(self.gamma.iter())
            .zip(z_recent_first)
            .map(|((a, g), z)| a * (z.abs() - c) + g * z)
            .sum()
    }
}

impl VarianceModel for Egarch {
    type Params = EgarchParams;

    fn name(&self) -> String {
        format!("EGARCH{}", self.orders)
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
        let mut x0 = vec![0.0];
        x0.extend(std::iter::repeat_n(0.05, q));
        x0.extend(std::iter::repeat_n(0.0, q));
        x0.extend(std::iter::repeat_n(0.9 / p as f64, p));
        Array1::from(x0)
    }

    fn bound_pairs(&self) -> Vec<(f64, Option<f64>)> {
        let Orders { p, q } = self.orders;
        let mut bounds = vec![(-10.0, Some(10.0))];
        bounds.extend(std::iter::repeat_n((1e-6, Some(1.0)), q));
        bounds.extend(std::iter::repeat_n((-1.0, Some(1.0)), q));
        bounds.extend(std::iter::repeat_n((1e-6, Some(1.0)), p));
        bounds
    }

    fn unpack(&self, theta: &[f64]) -> VolResult<EgarchParams> {
        self.check_params(theta)?;
        let q = self.orders.q;
        Ok(EgarchParams {
            omega: theta[0],
            alpha: theta[1..1 + q].to_vec(),
            gamma: theta[1 + q..1 + 2 * q].to_vec(),
            beta: theta[1 + 2 * q..].to_vec(),
        })
    }

    /// Seed on the log scale.
    fn seed(&self, _params: &EgarchParams, shocks: &Array1<f64>) -> f64 {
        population_variance(shocks).ln()
    }

    fn recurse(
        &self, params: &EgarchParams, shocks: &Array1<f64>, mode: RecursionMode,
    ) -> Result<VarianceState, Divergence> {
        let n = shocks.len();
        let seed = self.seed(params, shocks);
        let mut guard = VarianceGuard::new(mode);
        let mut log_s2 = Array1::from_elem(n, seed);
        if n > 0 {
            guard.check(0, seed.exp())?;
        }
        for t in self.orders.burn_in()..n {
            let z: Vec<f64> = (0..self.orders.q)
                .map(|i| shocks[t - i - 1] / (0.5 * log_s2[t - i - 1]).exp())
                .collect();
            let persistence: f64 = params.beta.iter().enumerate().map(|(j, b)| b * log_s2[t - j - 1]).sum();
            let value = params.omega + params.news_impact(z.iter()) + persistence;
            guard.check(t, value.exp())?;
            log_s2[t] = value;
        }
        Ok(guard.finish(log_s2.mapv(f64::exp), shocks.clone(), None))
    }

    fn forecast(
        &self, params: &EgarchParams, state: &VarianceState, steps: usize,
    ) -> VolResult<Array1<f64>> {
        let Orders { p, q } = self.orders;
        let n = state.len();
        let start = n.saturating_sub(q);
        let mut z: VecDeque<f64> = state
            .residuals
            .slice(s![start..])
            .iter()
            .zip(state.sigma2.slice(s![start..]).iter())
            .map(|(e, s2)| e / s2.sqrt())
            .collect();
        let mut log_s2 = tail_window(&state.sigma2.mapv(f64::ln).to_vec(), p);
        let mut out = Array1::zeros(steps);
        for step in 0..steps {
            let h = params.omega + params.news_impact(z.iter().rev()) + weighted_lags(&params.beta, &log_s2);
            let sigma2 = h.exp();
            check_forecast_variance(step, sigma2)?;
            out[step] = sigma2.sqrt();
            push_window(&mut z, 0.0, q);
            push_window(&mut log_s2, h, p);
        }
        Ok(out)
    }

    fn spec(&self) -> ModelSpec {
        ModelSpec::Egarch(self.orders)
    }
}

/// Negative log-likelihood cost of an EGARCH(p, q) parameter vector.
///
/// # Errors
/// - `VolError::ParamLengthMismatch` if `params.len() != 1 + 2q + p`.
pub fn egarch_log_likelihood(params: &[f64], returns: &ReturnSeries, orders: Orders) -> VolResult<f64> {
    log_likelihood(&Egarch::new(orders), params, returns)
}

/// Fit an EGARCH(p, q) model by maximum likelihood.
pub fn estimate_egarch_params(
    returns: &ReturnSeries, orders: Orders, opts: &FitOptions,
) -> VolResult<FitResult> {
    estimate(&Egarch::new(orders), returns, opts)
}
