//! Adapter that exposes a user `LogLikelihood` as an `argmin` problem.
//!
//! Maximizing `ℓ(x)` becomes minimizing `c(θ) = -ℓ(x(θ))`, where `x(θ)` is
//! the [`BoxBounds`] reparameterization. Two behaviors differ from a plain
//! sign flip:
//!
//! - A non-finite `ℓ` (divergent variance path, overflow) is replaced by
//!   [`DIVERGENCE_COST`] so the line search can back away from it instead of
//!   aborting the run.
//! - Every finite evaluation is compared against a shared [`BestPoint`], so
//!   the runner can still report the best point seen if the solver fails.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        bounds::BoxBounds,
        finite_diff::fd_gradient,
        traits::LogLikelihood,
        types::{Cost, DIVERGENCE_COST, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};

/// Best evaluation observed so far, in the solver's (free) space.
#[derive(Debug, Clone, PartialEq)]
pub struct BestPoint {
    pub theta: Option<Theta>,
    pub cost: Cost,
}

impl Default for BestPoint {
    fn default() -> Self {
        Self { theta: None, cost: f64::INFINITY }
    }
}

impl BestPoint {
    fn offer(&mut self, theta: &Theta, cost: Cost) {
        if cost < self.cost {
            self.cost = cost;
            self.theta = Some(theta.clone());
        }
    }
}

/// Bridges a user `LogLikelihood` to `argmin`'s `CostFunction` and `Gradient`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
    pub bounds: &'a BoxBounds,
    pub best: &'a RefCell<BestPoint>,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(
        f: &'a F, data: &'a F::Data, bounds: &'a BoxBounds, best: &'a RefCell<BestPoint>,
    ) -> Self {
        Self { f, data, bounds, best }
    }

    /// Model-space parameters for a solver-space `θ`.
    pub fn constrained(&self, theta: &Theta) -> Theta {
        self.bounds.to_constrained(theta)
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `c(θ) = -ℓ(x(θ))`, substituting [`DIVERGENCE_COST`] for
    /// non-finite values.
    ///
    /// # Errors
    /// Propagates any `OptError` from the user's `value` via `?`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let x = self.constrained(theta);
        let ll = self.f.value(&x, self.data)?;
        let cost = if ll.is_finite() {
            (-ll).min(DIVERGENCE_COST)
        } else {
            log::debug!("non-finite log-likelihood {ll} at {x}; using divergence penalty");
            DIVERGENCE_COST
        };
        self.best.borrow_mut().offer(theta, cost);
        Ok(cost)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Gradient of the cost with respect to the solver-space `θ`.
    ///
    /// - With an analytic `∇ℓ(x)` the result is `-∇ℓ(x) ⊙ dx/dθ`.
    /// - Otherwise the penalized cost is finite-differenced directly in
    ///   θ-space (central first, forward as fallback).
    ///
    /// # Errors
    /// - Propagates user errors from `grad` other than
    ///   `GradientNotImplemented`.
    /// - Propagates errors raised by cost evaluations during FD.
    /// - Returns validation errors for wrong-length or non-finite gradients.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        let x = self.constrained(theta);
        match self.f.grad(&x, self.data) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(-(g * self.bounds.jacobian_diag(theta)))
            }
            Err(OptError::GradientNotImplemented) => {
                let grad = fd_gradient(theta, |t: &Theta| self.cost(t))?;
                Ok(grad)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Sign convention and divergence penalty of the cost.
    // - Best-point tracking across evaluations.
    // - Chain rule for analytic gradients under bounds.
    // -------------------------------------------------------------------------

    struct Quadratic;

    impl LogLikelihood for Quadratic {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            Ok(-theta.dot(theta))
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            Ok(theta.mapv(|v| -2.0 * v))
        }
    }

    fn wide_box(n: usize) -> BoxBounds {
        BoxBounds::from_pairs(&vec![(-10.0, Some(10.0)); n]).expect("bounds should be valid")
    }

    /// Log-likelihood that diverges for positive inputs.
    struct Cliff;

    impl LogLikelihood for Cliff {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            if theta[0] > 0.0 { Ok(f64::NEG_INFINITY) } else { Ok(theta[0]) }
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // The cost is the negated log-likelihood, and the best point follows
    // the lowest cost seen.
    //
    // Given
    // -----
    // - ℓ(x) = -xᵀx on (-10, 10)², evaluated at the free-space images of
    //   x = [1, 1] and then x = [0.5, 0].
    //
    // Expect
    // ------
    // - Costs 2.0 and 0.25; the tracker holds [0.5, 0].
    fn cost_negates_loglik_and_tracks_best_point() {
        // Arrange
        let bounds = wide_box(2);
        let best = RefCell::new(BestPoint::default());
        let adapter = ArgMinAdapter::new(&Quadratic, &(), &bounds, &best);
        let t1 = bounds.to_unconstrained(&array![1.0, 1.0]).expect("interior point should map");
        let t2 = bounds.to_unconstrained(&array![0.5, 0.0]).expect("interior point should map");

        // Act
        let c1 = adapter.cost(&t1).expect("cost should evaluate");
        let c2 = adapter.cost(&t2).expect("cost should evaluate");

        // Assert
        assert_relative_eq!(c1, 2.0, max_relative = 1e-9);
        assert_relative_eq!(c2, 0.25, max_relative = 1e-9);
        assert_eq!(best.borrow().theta, Some(t2));
    }

    #[test]
    // Purpose
    // -------
    // A divergent log-likelihood is mapped to the finite penalty rather
    // than an error.
    //
    // Given
    // -----
    // - A log-likelihood returning -∞ for positive x, evaluated at x = 1.
    //
    // Expect
    // ------
    // - `cost` returns `Ok(DIVERGENCE_COST)`.
    fn cost_replaces_divergence_with_penalty() {
        // Arrange
        let bounds = wide_box(1);
        let best = RefCell::new(BestPoint::default());
        let adapter = ArgMinAdapter::new(&Cliff, &(), &bounds, &best);
        let theta = bounds.to_unconstrained(&array![1.0]).expect("interior point should map");

        // Act
        let cost = adapter.cost(&theta).expect("divergence should not be an error");

        // Assert
        assert_eq!(cost, DIVERGENCE_COST);
    }

    #[test]
    // Purpose
    // -------
    // With bounds, the analytic gradient is chain-ruled through the
    // reparameterization and agrees with a finite-difference gradient.
    //
    // Given
    // -----
    // - ℓ(x) = -xᵀx with x in (-2, 2) and (0.1, ∞).
    //
    // Expect
    // ------
    // - Analytic and FD gradients agree to 1e-5.
    fn gradient_applies_chain_rule_under_bounds() {
        // Arrange
        let bounds = BoxBounds::from_pairs(&[(-2.0, Some(2.0)), (0.1, None)])
            .expect("bounds should be valid");
        let best = RefCell::new(BestPoint::default());
        let adapter = ArgMinAdapter::new(&Quadratic, &(), &bounds, &best);
        let theta = array![0.3, -0.4];

        // Act
        let analytic = adapter.gradient(&theta).expect("analytic gradient should evaluate");
        let numeric = fd_gradient(&theta, |t: &Theta| adapter.cost(t))
            .expect("FD gradient should evaluate");

        // Assert
        for (a, n) in analytic.iter().zip(numeric.iter()) {
            assert_relative_eq!(a, n, epsilon = 1e-5);
        }
    }
}
