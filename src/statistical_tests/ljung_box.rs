//! statistical_tests::ljung_box — Ljung–Box portmanteau test.
//!
//! Purpose
//! -------
//! Test a series for serial correlation up to a fixed lag, typically on the
//! standardized residuals `εₜ / σₜ` of a fitted volatility model. A good fit
//! leaves no autocorrelation behind.
//!
//! Key behaviors
//! -------------
//! - Compute demeaned sample autocorrelations
//!   ρ̂ₖ = ∑ₜ₌ₖ (Yₜ − Ȳ)(Yₜ₋ₖ − Ȳ) / ∑ₜ (Yₜ − Ȳ)² for k = 1..=lag.
//! - Form Q = n(n + 2) ∑ₖ ρ̂ₖ² / (n − k).
//! - Report the χ²(lag) upper-tail p-value of Q via `statrs`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input checks (length, finiteness, `1 ≤ lag < n`) go through
//!   [`validate_input`]; a constant series is rejected with
//!   [`LBError::ZeroVariance`](crate::statistical_tests::errors::LBError::ZeroVariance).
//! - `stat ≥ 0` and `p_value ∈ [0, 1]` whenever the test succeeds.
//!
//! Conventions
//! -----------
//! - Lag k pairs (Yₜ, Yₜ₋ₖ) for t = k,…,n−1; the autocorrelation
//!   denominator is the full-sample sum of squares (biased estimator, as in
//!   the usual Ljung–Box definition).
//!
//! Downstream usage
//! ----------------
//! - Call [`LBOutcome::ljung_box`] on
//!   `FitResult::standardized_residuals()` to check a fitted model; small
//!   p-values indicate leftover dependence.
//!
//! Testing notes
//! -------------
//! - Unit tests pin the statistic on a hand-computed series, check the
//!   closed-form χ²(2) tail, and cover validation and zero-variance errors.
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::statistical_tests::errors::{LBError, LBResult};
use crate::statistical_tests::validation::validate_input;

/// LBOutcome — outcome of a Ljung–Box test.
///
/// Fields
/// ------
/// - `lag`: number of autocorrelations pooled into the statistic.
/// - `n_obs`: series length used.
/// - `stat`: the Ljung–Box Q statistic.
/// - `p_value`: χ²(`lag`) upper-tail probability of `stat`.
#[derive(Debug, Copy, Clone)]
pub struct LBOutcome {
    lag: usize,
    n_obs: usize,
    stat: f64,
    p_value: f64,
}

impl LBOutcome {
    /// Run the Ljung–Box test on `data` with `lag` autocorrelations.
    ///
    /// Parameters
    /// ----------
    /// - `data`: `&[f64]`
    ///   Input series of length n ≥ 2; re-centred internally.
    /// - `lag`: `usize`
    ///   Number of lags; must satisfy `1 ≤ lag < n`.
    ///
    /// Returns
    /// -------
    /// `LBResult<LBOutcome>`
    ///   The statistic, its p-value, and the lag/length used.
    ///
    /// Errors
    /// ------
    /// - Validation errors from [`validate_input`].
    /// - `LBError::ZeroVariance` when every observation equals the mean.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// use rust_volatility::statistical_tests::LBOutcome;
    ///
    /// let data = vec![0.3, -0.1, 0.4, -0.5, 0.2, 0.1, -0.3];
    /// let outcome = LBOutcome::ljung_box(&data, 2).expect("valid input");
    ///
    /// assert!(outcome.stat() >= 0.0);
    /// assert!((0.0..=1.0).contains(&outcome.p_value()));
    /// ```
    pub fn ljung_box(data: &[f64], lag: usize) -> LBResult<Self> {
        validate_input(data, lag)?;
        let n = data.len();
        let mean = calc_mean(data);
        let rho = calc_autocorrelations(data, lag, mean)?;
        let stat = calc_q_stat(&rho, n);
        let p_value = ChiSquared::new(lag as f64).map_or(f64::NAN, |chi| (1.0 - chi.cdf(stat)).clamp(0.0, 1.0));

        Ok(LBOutcome { lag, n_obs: n, stat, p_value })
    }

    /// Number of lags pooled into the statistic.
    pub fn lag(&self) -> usize {
        self.lag
    }

    /// Series length.
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// Ljung–Box Q statistic.
    pub fn stat(&self) -> f64 {
        self.stat
    }

    /// χ²(`lag`) p-value of [`stat`](Self::stat).
    pub fn p_value(&self) -> f64 {
        self.p_value
    }
}

//
// ---------- Private helpers ----------
//

#[inline]
fn calc_mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

/// ρ̂ₖ for k = 1..=lag; errors when the centred sum of squares is zero.
fn calc_autocorrelations(data: &[f64], lag: usize, mean: f64) -> LBResult<Vec<f64>> {
    let denom: f64 = data.iter().map(|y| (y - mean).powi(2)).sum();
    if denom <= 0.0 {
        return Err(LBError::ZeroVariance);
    }

    Ok((1..=lag)
        .map(|k| {
            data[k..]
                .iter()
                .zip(data)
                .map(|(y_t, y_t_min_k)| (y_t - mean) * (y_t_min_k - mean))
                .sum::<f64>()
                / denom
        })
        .collect())
}

/// Q = n(n + 2) ∑ₖ ρ̂ₖ² / (n − k).
#[inline]
fn calc_q_stat(rho: &[f64], n: usize) -> f64 {
    let nf = n as f64;
    let weighted: f64 = rho.iter().enumerate().map(|(i, r)| r * r / (n - (i + 1)) as f64).sum();
    nf * (nf + 2.0) * weighted
}
