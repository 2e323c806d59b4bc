//! Multi-step GARCH variance forecasting.
//!
//! Purpose
//! -------
//! Project a GARCH(p, q) conditional variance `h` steps past the end of the
//! sample with zero future shocks, and provide the small rolling-buffer
//! helpers the other variants reuse for their own projections.
//!
//! Key behaviors
//! -------------
//! - [`forecast_garch`] works on owned `VecDeque` buffers seeded from the
//!   most recent `q` squared shocks and `p` variances; the caller's history
//!   is never mutated.
//! - Missing history (fewer than `q` shocks or `p` variances) contributes
//!   zero to the update.
//! - After each step `0.0` is pushed as the future squared shock and the
//!   new variance as the latest variance.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs must be finite; outputs are `sqrt(σ²ₕ)`.
//! - A negative or non-finite forecast variance is an error and is never
//!   clamped.
//!
//! Conventions
//! -----------
//! - History slices are ordered oldest first, most recent last.
//! - `alpha[i]` multiplies the shock `i + 1` steps back; `beta[j]` the
//!   variance `j + 1` steps back.
use std::collections::VecDeque;

use ndarray::Array1;

use crate::volatility::errors::{VolError, VolResult};

/// `steps`-ahead GARCH volatility forecast.
///
/// Parameters
/// ----------
/// - `omega`: `f64`
///   Variance intercept.
/// - `alpha`: `&[f64]`
///   ARCH weights (length `q`, possibly 0).
/// - `beta`: `&[f64]`
///   GARCH weights (length `p`).
/// - `last_shocks`: `&[f64]`
///   Recent **squared** residuals, most recent last.
/// - `last_variances`: `&[f64]`
///   Recent conditional variances, most recent last.
/// - `steps`: `usize`
///   Forecast horizon; `0` yields an empty path.
///
/// Returns
/// -------
/// `VolResult<Array1<f64>>`
///   Forecast volatilities `σ̂_{T+1}, …, σ̂_{T+steps}`.
///
/// Errors
/// ------
/// - `VolError::NonFiniteParam` if `omega`, `alpha` or `beta` holds a
///   non-finite value (indices follow the flat `ω, α, β` layout).
/// - `VolError::InvalidForecastInput` for a non-finite history entry.
/// - `VolError::InvalidForecastVariance` if a projected variance is
///   negative or non-finite.
///
/// Example
/// -------
/// ```
/// use rust_volatility::volatility::forecast_garch;
///
/// let path = forecast_garch(0.1, &[], &[0.9], &[], &[1.0], 3)?;
/// assert_eq!(path.len(), 3);
/// # Ok::<(), rust_volatility::volatility::errors::VolError>(())
/// ```
pub fn forecast_garch(
    omega: f64, alpha: &[f64], beta: &[f64], last_shocks: &[f64], last_variances: &[f64],
    steps: usize,
) -> VolResult<Array1<f64>> {
    let coefs = std::iter::once(&omega).chain(alpha).chain(beta);
    if let Some((index, &value)) = coefs.enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(VolError::NonFiniteParam { index, value });
    }
    check_history(last_shocks, "Squared shocks must be finite.")?;
    check_history(last_variances, "Variances must be finite.")?;

    let mut shocks = tail_window(last_shocks, alpha.len());
    let mut variances = tail_window(last_variances, beta.len());
    let mut out = Array1::zeros(steps);
    for step in 0..steps {
        let sigma2 = omega + weighted_lags(alpha, &shocks) + weighted_lags(beta, &variances);
        check_forecast_variance(step, sigma2)?;
        out[step] = sigma2.sqrt();
        push_window(&mut shocks, 0.0, alpha.len());
        push_window(&mut variances, sigma2, beta.len());
    }
    Ok(out)
}

// ---- Buffer helpers shared by the per-variant forecasts ----

/// Owned copy of the last `cap` entries of `history`.
pub(crate) fn tail_window(history: &[f64], cap: usize) -> VecDeque<f64> {
    history[history.len().saturating_sub(cap)..].iter().copied().collect()
}

/// Push `value` as the newest entry, dropping the oldest beyond `cap`.
pub(crate) fn push_window(buf: &mut VecDeque<f64>, value: f64, cap: usize) {
    buf.push_back(value);
    while buf.len() > cap {
        buf.pop_front();
    }
}

/// `Σ wᵢ·buf[-(i+1)]`, treating missing entries as zero.
pub(crate) fn weighted_lags(weights: &[f64], buf: &VecDeque<f64>) -> f64 {
    weights.iter().zip(buf.iter().rev()).map(|(w, x)| w * x).sum()
}

/// Reject a negative or non-finite projected variance.
pub(crate) fn check_forecast_variance(step: usize, sigma2: f64) -> VolResult<()> {
    if !sigma2.is_finite() || sigma2 < 0.0 {
        return Err(VolError::InvalidForecastVariance { step, value: sigma2 });
    }
    Ok(())
}

fn check_history(history: &[f64], reason: &'static str) -> VolResult<()> {
    match history.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(VolError::InvalidForecastInput { index, value, reason }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The pure-GARCH projection with and without ARCH terms.
    // - Monotone convergence toward ω/(1−β) from below.
    // - Error reporting for bad inputs and explosive parameters.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A GARCH(1,0) forecast from unit variance stays positive and finite.
    //
    // Given
    // -----
    // - ω = 0.1, β = [0.9], last variance 1.0, three steps.
    //
    // Expect
    // ------
    // - Three positive values, all equal to 1 (the fixed point).
    fn forecast_garch_without_arch_terms_returns_positive_path() {
        // Act
        let path = forecast_garch(0.1, &[], &[0.9], &[], &[1.0], 3).expect("forecast should succeed");

        // Assert
        assert_eq!(path.len(), 3);
        for v in path.iter() {
            assert!(*v > 0.0);
            assert_relative_eq!(*v, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // With zero ARCH weight the forecast rises monotonically toward the
    // unconditional variance when seeded below it.
    //
    // Given
    // -----
    // - ω = 0.1, α = [0], β = [0.5] (limit 0.2), seed variance 0.05.
    //
    // Expect
    // ------
    // - Non-decreasing variances, all below 0.2.
    fn forecast_garch_rises_toward_unconditional_variance() {
        // Act
        let path = forecast_garch(0.1, &[0.0], &[0.5], &[0.3], &[0.05], 20)
            .expect("forecast should succeed");

        // Assert
        let var = path.mapv(|v| v * v);
        for w in var.windows(2) {
            assert!(w[1] >= w[0] - 1e-15, "{var:?}");
        }
        assert!(var.iter().all(|&v| v < 0.2));
    }

    #[test]
    // Purpose
    // -------
    // The first step uses the most recent squared shock; later steps see a
    // zero future shock.
    //
    // Given
    // -----
    // - ω = 0.1, α = [0.1], β = [0.8], shocks [9, 4], variances [1, 2].
    //
    // Expect
    // ------
    // - σ²₁ = 0.1 + 0.4 + 1.6 = 2.1; σ²₂ = 0.1 + 0.8·2.1.
    fn forecast_garch_uses_latest_history_then_zero_shocks() {
        // Act
        let path = forecast_garch(0.1, &[0.1], &[0.8], &[9.0, 4.0], &[1.0, 2.0], 2)
            .expect("forecast should succeed");

        // Assert
        assert_relative_eq!(path[0] * path[0], 2.1, epsilon = 1e-12);
        assert_relative_eq!(path[1] * path[1], 0.1 + 0.8 * 2.1, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // A negative projected variance is reported, not clipped.
    //
    // Given
    // -----
    // - ω = -1 with zero history.
    //
    // Expect
    // ------
    // - `InvalidForecastVariance { step: 0, .. }`.
    fn forecast_garch_rejects_negative_variance() {
        let result = forecast_garch(-1.0, &[0.1], &[0.8], &[], &[], 2);
        assert!(matches!(result, Err(VolError::InvalidForecastVariance { step: 0, .. })));
    }

    #[test]
    // Purpose
    // -------
    // Non-finite inputs are rejected before any projection.
    //
    // Given
    // -----
    // - A NaN squared shock, then a NaN β.
    //
    // Expect
    // ------
    // - `InvalidForecastInput` and `NonFiniteParam { index: 2, .. }`.
    fn forecast_garch_rejects_non_finite_inputs() {
        assert!(matches!(
            forecast_garch(0.1, &[0.1], &[0.8], &[f64::NAN], &[1.0], 1),
            Err(VolError::InvalidForecastInput { index: 0, .. })
        ));
        assert!(matches!(
            forecast_garch(0.1, &[0.1], &[f64::NAN], &[1.0], &[1.0], 1),
            Err(VolError::NonFiniteParam { index: 2, .. })
        ));
    }
}
