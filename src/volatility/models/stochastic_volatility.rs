//! Stochastic volatility — deterministic log-variance approximation.
//!
//! The latent AR(1) log-variance `hₜ = μ + φ·hₜ₋₁ + σ_η·ηₜ` is replaced by
//! its conditional-mean path (`ηₜ = 0`), started at the stationary mean:
//!
//! ```text
//! h₀ = μ / (1 − φ),   hₜ = μ + φ·hₜ₋₁,   σ²ₜ = exp(hₜ)
//! ```
//!
//! The resulting Gaussian likelihood is an approximation: `σ_η` is carried
//! in the layout `[μ, φ, σ_η]` and estimated within its bounds, but it does
//! not enter the likelihood. The path does not depend on the data, so an
//! all-missing series still has a finite likelihood.
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

/// Approximate stochastic-volatility model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StochasticVolatility;

/// Unpacked stochastic-volatility parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvParams {
    pub mu: f64,
    pub phi: f64,
    pub sigma_eta: f64,
}

impl VarianceModel for StochasticVolatility {
    type Params = SvParams;

    fn name(&self) -> String {
        "SV".to_string()
    }

    fn param_names(&self) -> Vec<String> {
        vec!["mu".to_string(), "phi".to_string(), "sigma_eta".to_string()]
    }

    fn initial_guess(&self) -> Array1<f64> {
        Array1::from(vec![0.0, 0.95, 0.2])
    }

    fn bound_pairs(&self) -> Vec<(f64, Option<f64>)> {
        vec![(-10.0, Some(10.0)), (0.01, Some(0.999)), (1e-4, Some(5.0))]
    }

    fn unpack(&self, theta: &[f64]) -> VolResult<SvParams> {
        self.check_params(theta)?;
        Ok(SvParams { mu: theta[0], phi: theta[1], sigma_eta: theta[2] })
    }

    /// Stationary mean of the log-variance.
    fn seed(&self, params: &SvParams, _shocks: &Array1<f64>) -> f64 {
        params.mu / (1.0 - params.phi)
    }

    fn recurse(
        &self, params: &SvParams, shocks: &Array1<f64>, mode: RecursionMode,
    ) -> Result<VarianceState, Divergence> {
        let n = shocks.len();
        let mut guard = VarianceGuard::new(mode);
        let mut h = Array1::zeros(n);
        let mut prev = self.seed(params, shocks);
        for t in 0..n {
            if t > 0 {
                prev = params.mu + params.phi * prev;
            }
            guard.check(t, prev.exp())?;
            h[t] = prev;
        }
        Ok(guard.finish(h.mapv(f64::exp), shocks.clone(), None))
    }

    fn forecast(
        &self, params: &SvParams, state: &VarianceState, steps: usize,
    ) -> VolResult<Array1<f64>> {
        let mut h = match state.len().checked_sub(1) {
            Some(i) => state.sigma2[i].ln(),
            None => self.seed(params, &state.sigma2),
        };
        let mut out = Array1::zeros(steps);
        for step in 0..steps {
            h = params.mu + params.phi * h;
            let sigma2 = h.exp();
            check_forecast_variance(step, sigma2)?;
            out[step] = sigma2.sqrt();
        }
        Ok(out)
    }

    fn spec(&self) -> ModelSpec {
        ModelSpec::StochasticVolatility
    }
}

/// Negative log-likelihood cost of a stochastic-volatility parameter vector.
///
/// # Errors
/// - `VolError::ParamLengthMismatch` if `params.len() != 3`.
pub fn sv_log_likelihood(params: &[f64], returns: &ReturnSeries) -> VolResult<f64> {
    log_likelihood(&StochasticVolatility, params, returns)
}

/// Fit the approximate stochastic-volatility model by maximum likelihood.
pub fn estimate_sv_params(returns: &ReturnSeries, opts: &FitOptions) -> VolResult<FitResult> {
    estimate(&StochasticVolatility, returns, opts)
}
