//! Numerical stability utilities.
//!
//! Provides safe implementations of the nonlinear maps used to carry box
//! constrained parameters into the unconstrained space the L-BFGS solver
//! works in. The functions follow guarded strategies similar to those in
//! major ML libraries, using explicit cutoffs (`|x| > 20.0`) to keep `f64`
//! arithmetic in a well-conditioned regime.
//!
//! # Provided items
//! - [`BOUND_MARGIN`]: relative distance kept from a bound when a starting
//!   point is pulled into the interior of its box.
//! - [`safe_softplus`] / [`safe_softplus_inv`]: ℝ ↔ (0, ∞), used for
//!   half-open bounds `(low, ∞)`.
//! - [`safe_logistic`] / [`safe_logit`]: ℝ ↔ (0, 1), used for closed
//!   bounds `(low, high)`.

/// Relative interior margin for starting points that sit on a bound.
///
/// A point exactly on a bound maps to `±∞` under the logit/softplus
/// inverse. Starting points are pulled inside the box by this fraction of
/// its width, or of `max(|low|, 1)` for half-open boxes, so a start on a
/// bound moves by a negligible amount. Coordinates that stay pinned there
/// are released by the projected-gradient refinement in
/// `loglik_optimizer::refine`.
pub const BOUND_MARGIN: f64 = 1e-9;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// - For sufficiently large `x`, `softplus(x) ≈ x`.
/// - Otherwise, it falls back to `ln1p(exp(x))`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Stable inverse of softplus on `(0, ∞)`: returns `t = ln(exp(x) - 1)`.
///
/// - For sufficiently large `x`, `ln(exp(x) - 1) ≈ x`.
/// - Otherwise, it uses `ln(expm1(x))`.
///
/// # Parameters
/// - `x`: a positive real (the softplus output), must be finite and `> 0`.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}

/// Numerically stable logistic: `σ(x) = 1 / (1 + exp(-x))`.
///
/// Evaluates `exp` only on non-positive arguments so neither branch can
/// overflow. The result lies in `[0, 1]`; it saturates to exactly `0` or
/// `1` only for `|x|` beyond roughly 37.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Stable logit on `(0, 1)`: returns `ln(u / (1 - u))`.
///
/// Uses `ln_1p(-u)` for the denominator so values of `u` close to zero
/// keep full precision.
///
/// # Parameters
/// - `u`: a probability-like value strictly inside `(0, 1)`.
pub fn safe_logit(u: f64) -> f64 {
    u.ln() - (-u).ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of the guarded transforms with naive formulas on a safe
    //   grid.
    // - Inverse relationships (softplus/softplus_inv, logistic/logit).
    // - Tail behavior: no overflow, outputs stay in range.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `safe_logistic` matches the naive formula where the naive formula is
    // well conditioned.
    //
    // Given
    // -----
    // - A grid of inputs in [-10, 10].
    //
    // Expect
    // ------
    // - Relative agreement to 1e-12.
    fn safe_logistic_matches_naive_formula_on_safe_grid() {
        for i in -20..=20 {
            let x = i as f64 * 0.5;
            let naive = 1.0 / (1.0 + (-x).exp());
            assert_relative_eq!(safe_logistic(x), naive, max_relative = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Logit inverts logistic on the interior of (0, 1).
    //
    // Given
    // -----
    // - Probabilities from 1e-6 to 1 - 1e-6.
    //
    // Expect
    // ------
    // - `safe_logistic(safe_logit(u)) ≈ u`.
    fn safe_logit_inverts_safe_logistic() {
        for &u in &[1e-6, 1e-3, 0.1, 0.5, 0.9, 0.999, 1.0 - 1e-6] {
            assert_relative_eq!(safe_logistic(safe_logit(u)), u, max_relative = 1e-9);
        }
    }

    #[test]
    // Purpose
    // -------
    // Softplus inverse round-trips on small and large magnitudes, including
    // the guarded branch above the cutoff.
    //
    // Given
    // -----
    // - Positive values spanning 1e-6 to 50.
    //
    // Expect
    // ------
    // - `safe_softplus(safe_softplus_inv(x)) ≈ x`.
    fn safe_softplus_inv_inverts_safe_softplus() {
        for &x in &[1e-6, 1e-2, 1.0, 5.0, 19.9, 25.0, 50.0] {
            assert_relative_eq!(safe_softplus(safe_softplus_inv(x)), x, max_relative = 1e-9);
        }
    }

    #[test]
    // Purpose
    // -------
    // Extreme arguments never overflow.
    //
    // Given
    // -----
    // - Inputs of magnitude 1e3.
    //
    // Expect
    // ------
    // - Finite outputs inside the documented ranges.
    fn transforms_stay_finite_in_the_tails() {
        assert_eq!(safe_logistic(1e3), 1.0);
        assert_eq!(safe_logistic(-1e3), 0.0);
        assert!(safe_softplus(1e3).is_finite());
        assert!(safe_softplus(-1e3) >= 0.0);
    }
}
