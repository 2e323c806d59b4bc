//! HARCH — heterogeneous ARCH over a set of averaging horizons.
//!
//! ```text
//! σ²ₜ = ω + Σᵢ αᵢ · mean(r²ₜ₋ₗᵢ, …, r²ₜ₋₁)      for t ≥ max(lags)
//! ```
//!
//! Every entry before `max(lags)` keeps the population-variance seed. Layout
//! `[ω, α₁..α_k]` for `k` lags; ω is bounded below only (`1e-6`), each α in
//! `(1e-6, 1)`. Forecasts extend the window of squared returns with zeros.
use std::collections::VecDeque;

use ndarray::Array1;

use crate::volatility::{
    core::{
        data::{ReturnSeries, population_variance},
        estimation::estimate,
        forecasts::{check_forecast_variance, push_window, tail_window},
        likelihood::log_likelihood,
        options::FitOptions,
        orders::HarchLags,
        results::FitResult,
        state::{RecursionMode, VarianceGuard, VarianceState},
        variance_model::VarianceModel,
    },
    errors::{Divergence, VolResult},
    models::ModelSpec,
};

/// HARCH model over a lag-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harch {
    pub lags: HarchLags,
}

/// Unpacked HARCH parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct HarchParams {
    pub omega: f64,
    pub alpha: Vec<f64>,
}

impl Harch {
    pub fn new(lags: HarchLags) -> Self {
        Self { lags }
    }

    /// `ω + Σ αᵢ·(sum of the last lagᵢ squared returns)/lagᵢ`.
    ///
    /// `squares` holds squared returns oldest first; a window longer than
    /// the available history sums what is there.
    fn update(&self, params: &HarchParams, squares: &VecDeque<f64>) -> f64 {
        let heterogeneous: f64 = params
            .alpha
            .iter()
            .zip(self.lags.as_slice())
            .map(|(a, &lag)| a * squares.iter().rev().take(lag).sum::<f64>() / lag as f64)
            .sum();
        params.omega + heterogeneous
    }
}

impl VarianceModel for Harch {
    type Params = HarchParams;

    fn name(&self) -> String {
        format!("HARCH{:?}", self.lags.as_slice())
    }

    fn param_names(&self) -> Vec<String> {
        let mut names = vec!["omega".to_string()];
        names.extend(self.lags.as_slice().iter().map(|l| format!("alpha_lag{l}")));
        names
    }

    fn initial_guess(&self) -> Array1<f64> {
        let mut x0 = vec![1e-6];
        x0.extend(std::iter::repeat_n(0.05, self.lags.len()));
        Array1::from(x0)
    }

    fn bound_pairs(&self) -> Vec<(f64, Option<f64>)> {
        let mut bounds = vec![(1e-6, None)];
        bounds.extend(std::iter::repeat_n((1e-6, Some(1.0)), self.lags.len()));
        bounds
    }

    fn unpack(&self, theta: &[f64]) -> VolResult<HarchParams> {
        self.check_params(theta)?;
        Ok(HarchParams { omega: theta[0], alpha: theta[1..].to_vec() })
    }

    fn seed(&self, _params: &HarchParams, shocks: &Array1<f64>) -> f64 {
        population_variance(shocks)
    }

    fn recurse(
        &self, params: &HarchParams, shocks: &Array1<f64>, mode: RecursionMode,
    ) -> Result<VarianceState, Divergence> {
        let n = shocks.len();
        let max_lag = self.lags.max_lag();
        let seed = self.seed(params, shocks);
        let mut guard = VarianceGuard::new(mode);
        let mut sigma2 = Array1::from_elem(n, seed);
        if n > 0 {
            guard.check(0, seed)?;
        }
        let mut squares: VecDeque<f64> = shocks.iter().take(max_lag).map(|r| r * r).collect();
        for t in max_lag..n {
            let value = self.update(params, &squares);
            guard.check(t, value)?;
            sigma2[t] = value;
            push_window(&mut squares, shocks[t].powi(2), max_lag);
        }
        Ok(guard.finish(sigma2, shocks.clone(), None))
    }

    fn forecast(
        &self, params: &HarchParams, state: &VarianceState, steps: usize,
    ) -> VolResult<Array1<f64>> {
        let max_lag = self.lags.max_lag();
        let squares: Vec<f64> = state.residuals.iter().map(|r| r * r).collect();
        let mut window = tail_window(&squares, max_lag);
        let mut out = Array1::zeros(steps);
        for step in 0..steps {
            let sigma2 = self.update(params, &window);
            check_forecast_variance(step, sigma2)?;
            out[step] = sigma2.sqrt();
            push_window(&mut window, 0.0, max_lag);
        }
        Ok(out)
    }

    fn spec(&self) -> ModelSpec {
        ModelSpec::Harch(self.lags.clone())
    }
}

/// Negative log-likelihood cost of a HARCH parameter vector.
///
/// # Errors
/// - `VolError::ParamLengthMismatch` if `params.len() != 1 + lags.len()`.
pub fn harch_log_likelihood(params: &[f64], returns: &ReturnSeries, lags: &HarchLags) -> VolResult<f64> {
    log_likelihood(&Harch::new(lags.clone()), params, returns)
}

/// Fit a HARCH model by maximum likelihood.
pub fn estimate_harch_params(
    returns: &ReturnSeries, lags: &HarchLags, opts: &FitOptions,
) -> VolResult<FitResult> {
    estimate(&Harch::new(lags.clone()), returns, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Window averages against a hand computation.
    // - Seeded entries before the longest lag.
    // - Zero future squared returns in the forecast.
    // -------------------------------------------------------------------------

    fn harch_1_2() -> Harch {
        Harch::new(HarchLags::new(vec![1, 2]).expect("valid lags"))
    }

    #[test]
    // Purpose
    // -------
    // Entries before max(lags) keep the seed; later entries average the
    // trailing squared returns.
    //
    // Given
    // -----
    // - Lags {1, 2}, ω = 0.1, α = (0.2, 0.3), returns [1, 2, 3].
    //
    // Expect
    // ------
    // - σ²₀ = σ²₁ = var; σ²₂ = 0.1 + 0.2·4 + 0.3·(1 + 4)/2.
    fn recursion_averages_trailing_windows() {
        // Arrange
        let model = harch_1_2();
        let params = model.unpack(&[0.1, 0.2, 0.3]).expect("valid params");
        let r = array![1.0, 2.0, 3.0];
        let var = population_variance(&r);

        // Act
        let state = model.recurse(&params, &r, RecursionMode::Strict).expect("no divergence");

        // Assert
        assert_relative_eq!(state.sigma2[0], var, epsilon = 1e-12);
        assert_relative_eq!(state.sigma2[1], var, epsilon = 1e-12);
        assert_relative_eq!(state.sigma2[2], 0.1 + 0.2 * 4.0 + 0.3 * 2.5, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // ω is unbounded above; α stays in (1e-6, 1).
    //
    // Given
    // -----
    // - Lags {1, 2}.
    //
    // Expect
    // ------
    // - Bounds `[(1e-6, None), (1e-6, 1), (1e-6, 1)]`.
    fn bounds_leave_omega_open_above() {
        assert_eq!(
            harch_1_2().bound_pairs(),
            vec![(1e-6, None), (1e-6, Some(1.0)), (1e-6, Some(1.0))]
        );
    }

    #[test]
    // Purpose
    // -------
    // Forecast windows fill up with zero squared returns.
    //
    // Given
    // -----
    // - Lags {1, 2}, ω = 0.1, α = (0.2, 0.3), returns [1, 2, 3].
    //
    // Expect
    // ------
    // - σ²₁ = 0.1 + 0.2·9 + 0.3·(4+9)/2; σ²₂ = 0.1 + 0.3·9/2; σ²₃ = 0.1.
    fn forecast_uses_zero_future_squares() {
        // Arrange
        let model = harch_1_2();
        let params = model.unpack(&[0.1, 0.2, 0.3]).expect("valid params");
        let state = model.recurse(&params, &array![1.0, 2.0, 3.0], RecursionMode::Strict).expect("no divergence");

        // Act
        let path = model.forecast(&params, &state, 3).expect("forecast should succeed");

        // Assert
        assert_relative_eq!(path[0] * path[0], 0.1 + 1.8 + 0.3 * 6.5, epsilon = 1e-12);
        assert_relative_eq!(path[1] * path[1], 0.1 + 0.3 * 4.5, epsilon = 1e-12);
        assert_relative_eq!(path[2] * path[2], 0.1, epsilon = 1e-12);
    }
}
