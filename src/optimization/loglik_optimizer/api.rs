//! High-level entry point for maximizing a user-provided `LogLikelihood`
//! over a box.
//!
//! [`maximize_bounded`] selects an L-BFGS solver with the configured line
//! search, wraps the model in an `ArgMinAdapter` (which minimizes `-ℓ`
//! through the [`BoxBounds`] reparameterization) and delegates to
//! `run_lbfgs`. Every solver stop is then checked in model space with the
//! projected gradient. A stop that is not a first-order point of the box
//! problem is refined by projected-gradient steps and the solver is
//! restarted from there, up to [`MAX_BOUND_RESTARTS`] times.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::{ArgMinAdapter, BestPoint},
        bounds::BoxBounds,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        refine::{BoxObjective, is_stationary, refine_in_box, stationarity},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};

/// Refinement-and-restart rounds after the first solver run.
pub const MAX_BOUND_RESTARTS: usize = 4;

/// Maximize `ℓ(x)` subject to `x` lying in `bounds`.
///
/// `x0` is given in model space; points on or outside a bound are pulled
/// into the interior before the free-space start is computed. The returned
/// `theta_hat` is in model space and lies inside `bounds`.
///
/// `converged` is `true` only when the last run terminated normally and
/// the projected gradient at `theta_hat` passes the stationarity test.
/// Otherwise `status` says why.
///
/// # Errors
/// - `OptError::BoundsDimMismatch` if `x0.len() != bounds.len()`.
/// - Propagates any error from `f.check` on the (interior) start point.
/// - Propagates builder errors and the errors `run_lbfgs` surfaces.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use rust_volatility::optimization::errors::OptResult;
/// use rust_volatility::optimization::loglik_optimizer::{
///     BoxBounds, LogLikelihood, MLEOptions, Theta, maximize_bounded,
/// };
///
/// struct Concave;
/// impl LogLikelihood for Concave {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let bounds = BoxBounds::from_pairs(&[(-1.0, Some(1.0)), (-1.0, Some(1.0))])?;
/// let out = maximize_bounded(&Concave, &array![0.1, -0.2], &bounds, &(), &MLEOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), rust_volatility::optimization::errors::OptError>(())
/// ```
pub fn maximize_bounded<F: LogLikelihood>(
    f: &F, x0: &Theta, bounds: &BoxBounds, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    let obj = BoxObjective::new(f, data, bounds);
    let mut outcome = solve_from(f, x0, bounds, data, opts)?;
    let mut pg_norm = stationarity(&obj, &outcome.theta_hat)?;
    let mut iterations = outcome.iterations;

    for round in 1..=MAX_BOUND_RESTARTS {
        if is_stationary(pg_norm, -outcome.value) {
            break;
        }
        log::debug!(
            "solver stopped at a non-stationary point (|Pg|_inf = {pg_norm:.3e}, loglik = {:.6}); \
             refining in model space, round {round}",
            outcome.value
        );
        let refined = refine_in_box(&obj, &outcome.theta_hat)?;
        iterations += refined.iterations;
        if refined.iterations == 0 {
            break;
        }
        if is_stationary(refined.pg_norm, refined.cost) {
            pg_norm = refined.pg_norm;
            outcome = OptimOutcome::from_refinement(
                refined.theta,
                -refined.cost,
                refined.iterations,
                refined.pg_norm,
                true,
            )?;
            break;
        }

        let restarted = solve_from(f, &refined.theta, bounds, data, opts)?;
        iterations += restarted.iterations;
        if restarted.value >= -refined.cost {
            pg_norm = stationarity(&obj, &restarted.theta_hat)?;
            outcome = restarted;
        } else {
            pg_norm = refined.pg_norm;
            outcome = OptimOutcome::from_refinement(
                refined.theta,
                -refined.cost,
                refined.iterations,
                refined.pg_norm,
                false,
            )?;
        }
    }

    outcome.iterations = iterations;
    if !is_stationary(pg_norm, -outcome.value) {
        outcome.converged = false;
        outcome.status = format!("{}; not stationary within the bounds (|Pg|_inf = {pg_norm:.3e})", outcome.status);
    }
    Ok(outcome)
}

/// One L-BFGS run from the model-space start `x0`.
fn solve_from<F: LogLikelihood>(
    f: &F, x0: &Theta, bounds: &BoxBounds, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    let theta0 = bounds.to_unconstrained(x0)?;
    f.check(&bounds.to_constrained(&theta0), data)?;
    let best = RefCell::new(BestPoint::default());
    let problem = ArgMinAdapter::new(f, data, bounds, &best);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Cost, Tolerances},
    };
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Bounded maximization with an interior and a boundary optimum.
    // - Recovery from a start on a corner of the box, where the free-space
    //   gradient vanishes.
    // - Recovery from divergent regions of the objective.
    // - Error surfacing from `check`.
    // -------------------------------------------------------------------------

    /// ℓ(x) = -Σ (x_i - c_i)².
    struct ShiftedBowl {
        center: Theta,
    }

    impl LogLikelihood for ShiftedBowl {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            let d = theta - &self.center;
            Ok(-d.dot(&d))
        }

        fn check(&self, theta: &Theta, _: &()) -> OptResult<()> {
            if theta.len() != self.center.len() {
                return Err(OptError::InvalidModelInput { text: "wrong length".to_string() });
            }
            Ok(())
        }
    }

    /// Concave in x but undefined (−∞) once x exceeds 2.
    struct Ledge;

    impl LogLikelihood for Ledge {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            let x = theta[0];
            if x > 2.0 { Ok(f64::NEG_INFINITY) } else { Ok(-(x - 1.5).powi(2)) }
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
    }

    fn opts(ls: LineSearcher) -> MLEOptions {
        let tols = Tolerances::new(Some(1e-8), Some(1e-12), Some(500)).expect("valid tolerances");
        MLEOptions::new(tols, ls, false, None).expect("valid options")
    }

    #[test]
    // Purpose
    // -------
    // Both line searches find an interior maximum.
    //
    // Given
    // -----
    // - Center (1, -2) inside (-10, 10)², start at the origin.
    //
    // Expect
    // ------
    // - θ̂ within 1e-4 of the center and ℓ(θ̂) ≈ 0.
    fn maximize_bounded_finds_interior_center_with_both_line_searches() {
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            // Arrange
            let model = ShiftedBowl { center: array![1.0, -2.0] };
            let bounds = BoxBounds::from_pairs(&[(-10.0, Some(10.0)), (-10.0, Some(10.0))])
                .expect("bounds should be valid");

            // Act
            let out = maximize_bounded(&model, &array![0.0, 0.0], &bounds, &(), &opts(ls))
                .expect("maximization should succeed");

            // Assert
            assert!((out.theta_hat[0] - 1.0).abs() < 1e-4, "{ls:?}: {:?}", out.theta_hat);
            assert!((out.theta_hat[1] + 2.0).abs() < 1e-4, "{ls:?}: {:?}", out.theta_hat);
            assert!(out.value > -1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // When the unconstrained optimum lies outside the box, the bounded
    // estimate sits at the nearest edge and never leaves the box.
    //
    // Given
    // -----
    // - Center (1, 5) with bounds x₀ ∈ (-1, 3), x₁ ∈ (0, 2).
    //
    // Expect
    // ------
    // - x̂₀ ≈ 1, x̂₁ close to 2 but ≤ 2.
    fn maximize_bounded_stops_at_the_box_edge() {
        // Arrange
        let model = ShiftedBowl { center: array![1.0, 5.0] };
        let bounds = BoxBounds::from_pairs(&[(-1.0, Some(3.0)), (0.0, Some(2.0))])
            .expect("bounds should be valid");

        // Act
        let out = maximize_bounded(&model, &array![0.0, 1.0], &bounds, &(), &opts(LineSearcher::MoreThuente))
            .expect("bounded maximization should succeed");

        // Assert
        assert!(bounds.contains(&out.theta_hat));
        assert!((out.theta_hat[0] - 1.0).abs() < 1e-3, "{:?}", out.theta_hat);
        assert!(out.theta_hat[1] > 1.9, "{:?}", out.theta_hat);
    }

    #[test]
    // Purpose
    // -------
    // A start on a corner of the box, where `dx/dθ` is nearly zero and the
    // solver sees a vanishing gradient, still ends at the interior maximum
    // and only then reports convergence.
    //
    // Given
    // -----
    // - Center (0.5, 0.5) in the unit box, start at the corner (1, 1).
    //
    // Expect
    // ------
    // - θ̂ within 1e-4 of the center, ℓ(θ̂) ≈ 0 and `converged`.
    fn maximize_bounded_leaves_a_saturated_corner() {
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            // Arrange
            let model = ShiftedBowl { center: array![0.5, 0.5] };
            let bounds = BoxBounds::from_pairs(&[(0.0, Some(1.0)), (0.0, Some(1.0))])
                .expect("bounds should be valid");

            // Act
            let out = maximize_bounded(&model, &array![1.0, 1.0], &bounds, &(), &opts(ls))
                .expect("maximization should succeed");

            // Assert
            assert!((out.theta_hat[0] - 0.5).abs() < 1e-4, "{ls:?}: {:?}", out.theta_hat);
            assert!((out.theta_hat[1] - 0.5).abs() < 1e-4, "{ls:?}: {:?}", out.theta_hat);
            assert!(out.value > -1e-6);
            assert!(out.converged, "{ls:?}: {}", out.status);
        }
    }

    #[test]
    // Purpose
    // -------
    // A divergent region next to the optimum does not abort the run.
    //
    // Given
    // -----
    // - ℓ undefined for x > 2, maximum at 1.5, start at 0 with a wide box.
    //
    // Expect
    // ------
    // - A finite outcome with x̂ ≤ 2 and ℓ(x̂) finite.
    fn maximize_bounded_survives_divergent_region() {
        // Arrange
        let bounds = BoxBounds::from_pairs(&[(-10.0, Some(10.0))]).expect("bounds should be valid");

        // Act
        let out = maximize_bounded(&Ledge, &array![0.0], &bounds, &(), &opts(LineSearcher::MoreThuente))
            .expect("divergent region should be penalized, not fatal");

        // Assert
        assert!(out.theta_hat[0] <= 2.0);
        assert!(out.value.is_finite());
        assert!(out.value > -1.5 * 1.5 - 1e-9, "no worse than the start point");
    }

    #[test]
    // Purpose
    // -------
    // A start point that fails the model's `check` is reported as such.
    //
    // Given
    // -----
    // - A 2-parameter model with 3 bounds and a 3-element start.
    //
    // Expect
    // ------
    // - `OptError::InvalidModelInput`.
    fn maximize_bounded_surfaces_check_errors() {
        // Arrange
        let model = ShiftedBowl { center: array![0.0, 0.0] };
        let bounds = BoxBounds::from_pairs(&[(-1.0, Some(1.0)); 3]).expect("bounds should be valid");

        // Act
        let result = maximize_bounded(&model, &array![0.0, 0.0, 0.0], &bounds, &(), &MLEOptions::default());

        // Assert
        assert!(matches!(result, Err(OptError::InvalidModelInput { .. })));
    }
}
