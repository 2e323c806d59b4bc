//! loglik_optimizer::finite_diff — finite-difference gradients with error capture.
//!
//! Purpose
//! -------
//! Approximate the gradient of a fallible scalar objective without letting
//! the `finitediff` API (whose closures must return plain `f64`) swallow
//! evaluation errors.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`] tries central differences first and falls back to
//!   forward differences when the central estimate is non-finite.
//! - [`run_fd_diff`] is the forward-difference leg, usable on its own when
//!   the caller already owns an error-capturing closure.
//! - [`fd_gradient_in_box`] differences in model space and never steps
//!   outside a [`BoxBounds`]: central where both neighbors fit, one-sided
//!   toward the interior at a bound.
//! - The first error raised inside the objective is stored in a
//!   `RefCell<Option<Error>>` and surfaced after differencing.
//!
//! Invariants & assumptions
//! ------------------------
//! - Returned gradients always satisfy [`validate_grad`].
//! - [`fd_gradient`] differences in whatever space the caller's `θ` lives
//!   in; the adapter uses the solver's free space.
//!
//! Testing notes
//! -------------
//! - Unit tests cover a smooth objective, closure error propagation, the
//!   central→forward fallback, the all-`NaN` failure path, and one-sided
//!   stencils at a bound.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{Grad, Theta, bounds::BoxBounds, validation::validate_grad},
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// fd_gradient — central-difference gradient with forward fallback.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Evaluation point; its length fixes the gradient dimension.
/// - `cost`: `C: Fn(&Theta) -> Result<f64, Error>`
///   Fallible objective. Errors are captured and re-raised after
///   differencing.
///
/// Returns
/// -------
/// `OptResult<Grad>`
///   A validated gradient from the central scheme, or from the forward
///   scheme when the central estimate failed validation or the objective
///   raised an error during central differencing.
///
/// Errors
/// ------
/// - Any error raised by `cost` during the forward pass, converted via
///   `From<Error> for OptError`.
/// - `OptError::InvalidGradient` when the forward estimate is non-finite.
pub fn fd_gradient<C>(theta: &Theta, cost: C) -> OptResult<Grad>
where
    C: Fn(&Theta) -> Result<f64, Error>,
{
    let closure_err: RefCell<Option<Error>> = RefCell::new(None);
    let func = |t: &Theta| -> f64 {
        match cost(t) {
            Ok(v) => v,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let central = theta.central_diff(&func);
    if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
        return Ok(central);
    }
    run_fd_diff(theta, &func, &closure_err)
}

/// run_fd_diff — forward-difference gradient with error capture and validation.
///
/// `func` is expected to write any evaluation error into `closure_err` and
/// return `NaN`. The cell is cleared on entry.
///
/// # Errors
/// - The captured error, if `func` raised one.
/// - `OptError::GradientDimMismatch` / `OptError::InvalidGradient` from
///   [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// fd_gradient_in_box — model-space gradient whose stencil stays in the box.
///
/// Parameters
/// ----------
/// - `x`: `&Theta`
///   Model-space point inside `bounds`.
/// - `bounds`: `&BoxBounds`
///   Box every evaluated point must respect.
/// - `cost`: `C: Fn(&Theta) -> OptResult<f64>`
///   Fallible objective, evaluated only at points of the box.
///
/// Returns
/// -------
/// `OptResult<Grad>`
///   Central differences with step `√ε · max(|xᵢ|, 1)` where both
///   neighbors lie in the box, a one-sided difference toward the interior
///   otherwise, and `0` for a coordinate whose box is narrower than the
///   step.
///
/// Errors
/// ------
/// - Any error raised by `cost`.
/// - `OptError::GradientDimMismatch` / `OptError::InvalidGradient` from
///   [`validate_grad`].
pub fn fd_gradient_in_box<C>(x: &Theta, bounds: &BoxBounds, cost: C) -> OptResult<Grad>
where
    C: Fn(&Theta) -> OptResult<f64>,
{
    bounds.check_dim(x.len())?;
    let c0 = cost(x)?;
    let step = f64::EPSILON.sqrt();
    let mut shifted = x.clone();
    let mut grad = Grad::zeros(x.len());
    for (i, b) in bounds.as_slice().iter().enumerate() {
        let xi = x[i];
        let h = step * xi.abs().max(1.0);
        let (up, down) = (xi + h, xi - h);
        grad[i] = match (b.contains(up), b.contains(down)) {
            (true, true) => {
                shifted[i] = up;
                let c_up = cost(&shifted)?;
                shifted[i] = down;
                let c_down = cost(&shifted)?;
                (c_up - c_down) / (up - down)
            }
            (true, false) => {
                shifted[i] = up;
                (cost(&shifted)? - c0) / (up - xi)
            }
            (false, true) => {
                shifted[i] = down;
                (c0 - cost(&shifted)?) / (xi - down)
            }
            (false, false) => 0.0,
        };
        shifted[i] = xi;
    }
    validate_grad(&grad, x.len())?;
    Ok(grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use approx::assert_relative_eq;
    use argmin::core::ArgminError;
    use ndarray::array;
    use std::cell::Cell;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Central differences on a smooth objective.
    // - Propagation of objective errors out of the FD closure.
    // - Fallback to forward differences when the central stencil straddles
    //   a region where the objective is undefined.
    //
    // They intentionally DO NOT cover:
    // - End-to-end optimizer behavior (see `api` tests and the integration
    //   suite).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `fd_gradient` matches the analytic gradient of a quadratic.
    //
    // Given
    // -----
    // - c(θ) = θᵀθ at θ = [1, -2].
    //
    // Expect
    // ------
    // - Gradient ≈ [2, -4].
    fn fd_gradient_matches_quadratic_gradient() {
        // Arrange
        let theta = array![1.0, -2.0];

        // Act
        let grad = fd_gradient(&theta, |t: &Theta| Ok(t.dot(t)))
            .expect("gradient of a quadratic should be computed");

        // Assert
        assert_relative_eq!(grad[0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(grad[1], -4.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Errors raised inside the objective surface as `OptError` instead of
    // being hidden behind a `NaN` gradient.
    //
    // Given
    // -----
    // - An objective that always fails with `ArgminError::NotImplemented`.
    //
    // Expect
    // ------
    // - `fd_gradient` returns `Err(OptError::NotImplemented { .. })`.
    fn fd_gradient_propagates_objective_error() {
        // Arrange
        let theta = array![0.5];
        let failing = |_: &Theta| -> Result<f64, Error> {
            Err(ArgminError::NotImplemented { text: "fd test".to_string() }.into())
        };

        // Act
        let result = fd_gradient(&theta, failing);

        // Assert
        match result {
            Err(OptError::NotImplemented { .. }) => {}
            other => panic!("expected NotImplemented, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // When the backward half of the central stencil is undefined, the
    // forward scheme still produces a usable gradient.
    //
    // Given
    // -----
    // - c(θ) = θ² for θ ≥ 0 and NaN below zero, evaluated at θ = 0.
    //
    // Expect
    // ------
    // - A finite gradient close to 0.
    fn fd_gradient_falls_back_to_forward_differences() {
        // Arrange
        let theta = array![0.0];
        let half_defined =
            |t: &Theta| -> Result<f64, Error> { Ok(if t[0] < 0.0 { f64::NAN } else { t[0] * t[0] }) };

        // Act
        let grad = fd_gradient(&theta, half_defined).expect("forward fallback should succeed");

        // Assert
        assert!(grad[0].is_finite());
        assert!(grad[0].abs() < 1e-4);
    }

    #[test]
    // Purpose
    // -------
    // An objective that is `NaN` everywhere yields `InvalidGradient`.
    //
    // Given
    // -----
    // - c(θ) = NaN.
    //
    // Expect
    // ------
    // - `Err(OptError::InvalidGradient { .. })`.
    fn run_fd_diff_rejects_non_finite_gradient() {
        // Arrange
        let theta = array![0.0, 1.0];
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| f64::NAN;

        // Act
        let result = run_fd_diff(&theta, &f, &closure_err);

        // Assert
        assert!(matches!(result, Err(OptError::InvalidGradient { .. })));
    }

    #[test]
    // Purpose
    // -------
    // At a bound the model-space stencil is one-sided and never evaluates
    // a point outside the box.
    //
    // Given
    // -----
    // - c(x) = (x₀ − 2)² + (x₁ + 1)² on (0, 1) × (0, ∞), at x = [1, 0].
    // - A cost that records whether it ever saw an out-of-box point.
    //
    // Expect
    // ------
    // - Gradient ≈ [-2, 2] and no out-of-box evaluation.
    fn fd_gradient_in_box_stays_inside_at_bounds() {
        // Arrange
        let bounds = BoxBounds::from_pairs(&[(0.0, Some(1.0)), (0.0, None)])
            .expect("bounds should be valid");
        let x = array![1.0, 0.0];
        let left_box = Cell::new(false);
        let cost = |t: &Theta| -> OptResult<f64> {
            if !bounds.contains(t) {
                left_box.set(true);
            }
            Ok((t[0] - 2.0).powi(2) + (t[1] + 1.0).powi(2))
        };

        // Act
        let grad = fd_gradient_in_box(&x, &bounds, cost).expect("gradient should evaluate");

        // Assert
        assert!(!left_box.get());
        assert_relative_eq!(grad[0], -2.0, epsilon = 1e-6);
        assert_relative_eq!(grad[1], 2.0, epsilon = 1e-6);
    }
}
