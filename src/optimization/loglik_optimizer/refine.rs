//! loglik_optimizer::refine — stationarity check and projected-gradient
//! refinement in model space.
//!
//! Purpose
//! -------
//! The L-BFGS run sees the box only through the logistic/softplus
//! reparameterization. Near a bound `dx/dθ → 0`, so the free-space gradient
//! vanishes whether or not the point is optimal, and the solver can report
//! convergence at a corner of the box that is far from the maximum. This
//! module judges a solver stop in model space and, when it is not a
//! first-order point, improves it with projected-gradient steps that move
//! along and off the bounds directly.
//!
//! Key behaviors
//! -------------
//! - [`BoxObjective`] evaluates the penalized cost `c(x) = -ℓ(x)` and its
//!   model-space gradient (analytic when the model has one, otherwise
//!   [`fd_gradient_in_box`]).
//! - [`stationarity`] returns the sup-norm of the projected gradient at a
//!   point; [`is_stationary`] compares it against [`KKT_TOL`].
//! - [`refine_in_box`] runs projected gradient descent with
//!   Barzilai–Borwein step lengths and an Armijo backtracking safeguard.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every point evaluated here lies in the box.
//! - [`refine_in_box`] never returns a point with a higher cost than its
//!   (projected) start.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the KKT test at interior and boundary points and
//!   recovery from a saturated corner of a separable bowl.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        bounds::BoxBounds,
        finite_diff::fd_gradient_in_box,
        traits::LogLikelihood,
        types::{Cost, DIVERGENCE_COST, Grad, Theta},
        validation::validate_grad,
    },
};

/// Relative tolerance on the projected gradient for accepting a point as
/// stationary: `‖P∇c(x)‖∞ ≤ KKT_TOL · (1 + |c(x)|)`.
pub const KKT_TOL: f64 = 1e-3;

/// Relative projected-gradient tolerance at which refinement stops early.
pub const REFINE_TOL: f64 = 1e-7;

/// Upper limit on projected-gradient iterations per refinement.
pub const REFINE_MAX_ITERS: usize = 200;

const ARMIJO_C: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 50;
const BB_STEP_MIN: f64 = 1e-12;
const BB_STEP_MAX: f64 = 1e6;

/// Model-space view of a [`LogLikelihood`] on a box.
pub struct BoxObjective<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
    pub bounds: &'a BoxBounds,
}

impl<'a, F: LogLikelihood> BoxObjective<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data, bounds: &'a BoxBounds) -> Self {
        Self { f, data, bounds }
    }

    /// `c(x) = -ℓ(x)`, with [`DIVERGENCE_COST`] for non-finite values.
    ///
    /// # Errors
    /// Propagates errors from the model's `value`.
    pub fn cost(&self, x: &Theta) -> OptResult<Cost> {
        let ll = self.f.value(x, self.data)?;
        Ok(if ll.is_finite() { (-ll).min(DIVERGENCE_COST) } else { DIVERGENCE_COST })
    }

    /// `∇c(x)` in model space.
    ///
    /// # Errors
    /// - Model errors other than `GradientNotImplemented`.
    /// - Gradient validation errors.
    pub fn gradient(&self, x: &Theta) -> OptResult<Grad> {
        match self.f.grad(x, self.data) {
            Ok(g) => {
                validate_grad(&g, x.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => {
                fd_gradient_in_box(x, self.bounds, |t: &Theta| self.cost(t))
            }
            Err(e) => Err(e),
        }
    }
}

/// Result of a projected-gradient refinement.
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    /// Model-space point, inside the box.
    pub theta: Theta,
    pub cost: Cost,
    /// `‖P∇c(theta)‖∞` at the returned point.
    pub pg_norm: f64,
    pub iterations: usize,
}

/// Sup-norm of the projected gradient at `x`.
///
/// # Errors
/// Propagates cost and gradient errors.
pub fn stationarity<F: LogLikelihood>(obj: &BoxObjective<'_, F>, x: &Theta) -> OptResult<f64> {
    let g = obj.gradient(x)?;
    Ok(sup_norm(&obj.bounds.projected_gradient(x, &g)))
}

/// Whether a projected-gradient norm is small enough for a cost of `cost`.
pub fn is_stationary(pg_norm: f64, cost: Cost) -> bool {
    pg_norm <= KKT_TOL * (1.0 + cost.abs())
}

/// refine_in_box — projected gradient descent from `x0`.
///
/// Parameters
/// ----------
/// - `obj`: `&BoxObjective<F>`
///   Cost, gradient and box.
/// - `x0`: `&Theta`
///   Model-space start; projected into the box first.
///
/// Returns
/// -------
/// `OptResult<Refinement>`
///   The last accepted iterate. Iteration stops when the projected
///   gradient falls below `REFINE_TOL · (1 + |c|)`, when no backtracked
///   step gives sufficient decrease, or after [`REFINE_MAX_ITERS`].
///
/// Errors
/// ------
/// - Propagates cost and gradient errors.
pub fn refine_in_box<F: LogLikelihood>(obj: &BoxObjective<'_, F>, x0: &Theta) -> OptResult<Refinement> {
    let bounds = obj.bounds;
    let mut x = bounds.project(x0);
    let mut c = obj.cost(&x)?;
    let mut g = obj.gradient(&x)?;
    let mut pg_norm = sup_norm(&bounds.projected_gradient(&x, &g));
    let mut step = 1.0 / sup_norm(&g).max(1.0);
    let mut iterations = 0;

    while iterations < REFINE_MAX_ITERS && pg_norm > REFINE_TOL * (1.0 + c.abs()) {
        let Some((x_new, c_new)) = backtrack(obj, &x, c, &g, step)? else {
            break;
        };
        let g_new = obj.gradient(&x_new)?;

        let s = &x_new - &x;
        let y = &g_new - &g;
        let sy = s.dot(&y);
        step = if sy > 0.0 {
            (s.dot(&s) / sy).clamp(BB_STEP_MIN, BB_STEP_MAX)
        } else {
            1.0 / sup_norm(&g_new).max(1.0)
        };

        x = x_new;
        c = c_new;
        g = g_new;
        pg_norm = sup_norm(&bounds.projected_gradient(&x, &g));
        iterations += 1;
    }

    Ok(Refinement { theta: x, cost: c, pg_norm, iterations })
}

// ---- Helper Methods ----

/// Armijo backtracking along the projected path `P(x − t·g)`.
fn backtrack<F: LogLikelihood>(
    obj: &BoxObjective<'_, F>, x: &Theta, c: Cost, g: &Grad, step: f64,
) -> OptResult<Option<(Theta, Cost)>> {
    let mut t = step;
    for _ in 0..MAX_BACKTRACKS {
        let trial = obj.bounds.project(&(x - &(g * t)));
        let decrease = g.dot(&(x - &trial));
        if decrease <= 0.0 {
            return Ok(None);
        }
        let c_trial = obj.cost(&trial)?;
        if c_trial <= c - ARMIJO_C * decrease {
            return Ok(Some((trial, c_trial)));
        }
        t *= 0.5;
    }
    Ok(None)
}

fn sup_norm(v: &Theta) -> f64 {
    v.iter().fold(0.0_f64, |m, x| m.max(x.abs()))
}
