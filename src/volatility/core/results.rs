//! Fitted-model output.
//!
//! [`FitResult`] is immutable once built: forecasting works on owned
//! copies of the tail of the fitted state and never mutates the result.
use chrono::NaiveDateTime;
use ndarray::Array1;

use crate::{
    optimization::loglik_optimizer::OptimOutcome,
    volatility::{core::state::VarianceState, errors::VolResult, models::ModelSpec},
};

/// Heuristic standard errors and the bands built from them.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceBands {
    pub stderr: Array1<f64>,
    pub lower: Array1<f64>,
    pub upper: Array1<f64>,
}

/// Result of fitting one variance model to one return series.
///
/// Fields
/// ------
/// - `spec`: variant and orders that produced the fit.
/// - `theta`: point estimate in the model's flat layout.
/// - `param_names`: one name per entry of `theta`.
/// - `volatility`: fitted `σₜ`, same length as the input series.
/// - `state`: the full recursion output behind `volatility` (variances,
///   residuals, auxiliary path, first divergence if any).
/// - `outcome`: optimizer diagnostics.
/// - `cost`: negative log-likelihood at `theta` (`+∞` if the fitted path
///   diverged).
/// - `bands`: present when confidence bands were requested and the fit is
///   valid.
/// - `conditional_mean`: `μ + λσₜ` for GARCH-in-Mean, `None` otherwise.
/// - `labels`: timestamps carried over from the input series.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub spec: ModelSpec,
    pub theta: Array1<f64>,
    pub param_names: Vec<String>,
    pub volatility: Array1<f64>,
    pub state: VarianceState,
    pub outcome: OptimOutcome,
    pub cost: f64,
    pub bands: Option<ConfidenceBands>,
    pub conditional_mean: Option<Array1<f64>>,
    pub labels: Option<Vec<NaiveDateTime>>,
}

impl FitResult {
    /// `true` when the fitted path is strictly positive and finite and the
    /// cost is finite.
    pub fn is_valid(&self) -> bool {
        self.state.is_valid()
            && self.cost.is_finite()
            && self.volatility.iter().all(|v| v.is_finite() && *v > 0.0)
    }

    /// Log-likelihood at the estimate (`-cost`).
    pub fn log_likelihood(&self) -> f64 {
        -self.cost
    }

    pub fn n_obs(&self) -> usize {
        self.volatility.len()
    }

    /// `(name, value)` pairs in layout order.
    pub fn named_params(&self) -> Vec<(String, f64)> {
        self.param_names.iter().cloned().zip(self.theta.iter().copied()).collect()
    }

    /// Residuals scaled by fitted volatility, `εₜ / σₜ`.
    pub fn standardized_residuals(&self) -> Array1<f64> {
        &self.state.residuals / &self.volatility
    }

    /// `steps`-ahead volatility forecast from the end of the sample.
    ///
    /// # Errors
    /// - Propagates the variant's forecast errors (non-finite history,
    ///   negative or non-finite projected variance).
    pub fn forecast(&self, steps: usize) -> VolResult<Array1<f64>> {
        self.spec.forecast(&self.theta.to_vec(), &self.state, steps)
    }
}
