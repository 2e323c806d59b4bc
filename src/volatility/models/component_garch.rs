//! Component GARCH(1,1) — Engle–Lee permanent/transitory decomposition.
//!
//! ```text
//! qₜ  = τ + φ·qₜ₋₁
//! σ²ₜ = ω + α·(ε²ₜ₋₁ − qₜ₋₁) + β·σ²ₜ₋₁ + qₜ₋₁
//! ```
//!
//! Layout `[ω, α, β, τ, φ]` with bounds `(1e-6, 1)` on the first four and
//! `φ ∈ (1e-6, 0.999)`. Both `q₀` and `σ²₀` start at the unconditional level
//! `τ / (1 − φ)`, so the seed does not depend on the data and a constant
//! series still has a finite likelihood. The permanent component `q` is
//! returned as the auxiliary path of the state.
use ndarray::Array1;

use crate::volatility::{
    core::{
        data::ReturnSeries,
        estimation::estimate,
        forecasts::check_forecast_variance,
        likelihood::log_likelihood,
        options::FitOptions,
        results::FitResult,
        state::{RecursionMode, VarianceGuard, VarianceState},
        variance_model::VarianceModel,
    },
    errors::{Divergence, VolResult},
    models::ModelSpec,
};

/// Component GARCH(1,1) model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComponentGarch;

/// Unpacked Component GARCH parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentGarchParams {
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
    pub tau: f64,
    pub phi: f64,
}

impl ComponentGarchParams {
    /// One step of the joint `(σ², q)` update from lagged values.
    fn step(&self, e2: f64, sigma2: f64, q: f64) -> (f64, f64) {
        let next_sigma2 = self.omega + self.alpha * (e2 - q) + self.beta * sigma2 + q;
        let next_q = self.tau + self.phi * q;
        (next_sigma2, next_q)
    }
}

impl VarianceModel for ComponentGarch {
    type Params = ComponentGarchParams;

    fn name(&self) -> String {
        "Component-GARCH(1,1)".to_string()
    }

    fn param_names(&self) -> Vec<String> {
        ["omega", "alpha", "beta", "tau", "phi"].iter().map(|s| s.to_string()).collect()
    }

    fn initial_guess(&self) -> Array1<f64> {
        Array1::from(vec![1e-6, 0.05, 0.85, 1e-6, 0.95])
    }

    fn bound_pairs(&self) -> Vec<(f64, Option<f64>)> {
        let mut bounds = vec![(1e-6, Some(1.0)); 4];
        bounds.push((1e-6, Some(0.999)));
        bounds
    }

    fn unpack(&self, theta: &[f64]) -> VolResult<ComponentGarchParams> {
        self.check_params(theta)?;
        Ok(ComponentGarchParams {
            omega: theta[0],
            alpha: theta[1],
            beta: theta[2],
            tau: theta[3],
            phi: theta[4],
        })
    }

    fn seed(&self, params: &ComponentGarchParams, _shocks: &Array1<f64>) -> f64 {
        params.tau / (1.0 - params.phi)
    }

    fn recurse(
        &self, params: &ComponentGarchParams, shocks: &Array1<f64>, mode: RecursionMode,
    ) -> Result<VarianceState, Divergence> {
        let n = shocks.len();
        let seed = self.seed(params, shocks);
        let mut guard = VarianceGuard::new(mode);
        let mut sigma2 = Array1::from_elem(n, seed);
        let mut q = Array1::from_elem(n, seed);
        if n > 0 {
            guard.check(0, seed)?;
        }
        for t in 1..n {
            let (s2, qt) = params.step(shocks[t - 1].powi(2), sigma2[t - 1], q[t - 1]);
            guard.check(t, s2)?;
            sigma2[t] = s2;
            q[t] = qt;
        }
        Ok(guard.finish(sigma2, shocks.clone(), Some(q)))
    }

    /// Projects `(σ², q)` jointly; the first step uses the last residual,
    /// later steps a zero shock. An empty state starts from `τ / (1 − φ)`.
    fn forecast(
        &self, params: &ComponentGarchParams, state: &VarianceState, steps: usize,
    ) -> VolResult<Array1<f64>> {
        let level = params.tau / (1.0 - params.phi);
        let last = state.len().checked_sub(1);
        let mut e2 = last.map_or(0.0, |i| state.residuals[i].powi(2));
        let mut sigma2 = last.map_or(level, |i| state.sigma2[i]);
        let mut q = match (last, &state.aux) {
            (Some(i), Some(aux)) => aux[i],
            _ => level,
        };
        let mut out = Array1::zeros(steps);
        for step in 0..steps {
            let (s2, qn) = params.step(e2, sigma2, q);
            check_forecast_variance(step, s2)?;
            out[step] = s2.sqrt();
            e2 = 0.0;
            sigma2 = s2;
            q = qn;
        }
        Ok(out)
    }

    fn spec(&self) -> ModelSpec {
        ModelSpec::ComponentGarch
    }
}

/// Negative log-likelihood cost of a Component GARCH parameter vector.
///
/// # Errors
/// - `VolError::ParamLengthMismatch` if `params.len() != 5`.
pub fn component_garch_log_likelihood(params: &[f64], returns: &ReturnSeries) -> VolResult<f64> {
    log_likelihood(&ComponentGarch, params, returns)
}

/// Fit a Component GARCH(1,1) model by maximum likelihood.
pub fn estimate_component_garch_params(returns: &ReturnSeries, opts: &FitOptions) -> VolResult<FitResult> {
    estimate(&ComponentGarch, returns, opts)
}
