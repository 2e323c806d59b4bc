//! loglik_optimizer::bounds — box constraints as a smooth reparameterization.
//!
//! Purpose
//! -------
//! Let the unconstrained L-BFGS solver minimize over a box
//! `low_i ≤ x_i ≤ high_i` by optimizing a free vector `θ` and mapping it
//! into the box on every evaluation. Whatever `θ` the solver proposes, the
//! model only ever sees an `x` inside its bounds.
//!
//! Key behaviors
//! -------------
//! - Closed boxes use `x = low + (high − low) · σ(θ)` with σ the logistic.
//! - Half-open boxes `(low, ∞)` use `x = low + softplus(θ)`.
//! - [`BoxBounds::to_unconstrained`] inverts the map for starting points,
//!   pulling points that sit on (or outside) a bound into the interior by
//!   [`BOUND_MARGIN`].
//! - [`BoxBounds::jacobian_diag`] supplies `dx/dθ` for chain-ruling an
//!   analytic gradient.
//! - [`BoxBounds::project`] and [`BoxBounds::projected_gradient`] work in
//!   model space. They back the stationarity check that runs after the
//!   solver stops, since near a bound `dx/dθ → 0` and a small free-space
//!   gradient says nothing about optimality there.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every bound has a finite `low`; `high`, when present, is finite and
//!   strictly greater than `low`. Enforced by [`Bound::new`].
//! - The forward map is monotone per coordinate, so the box optimum and the
//!   θ-space optimum coincide.
//!
//! Testing notes
//! -------------
//! - Unit tests cover bound validation, containment of the forward map for
//!   extreme θ, round trips on interior points, the interior pull for
//!   starting points on a bound, and projected gradients on active bounds.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::types::Theta,
    numerical_stability::transformations::{
        BOUND_MARGIN, safe_logistic, safe_logit, safe_softplus, safe_softplus_inv,
    },
};

/// A coordinate within this fraction of its bound's scale counts as
/// sitting on the bound.
pub const ACTIVE_TOL: f64 = 1e-6;

/// One coordinate's admissible interval.
///
/// `high == None` means the interval is unbounded above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub low: f64,
    pub high: Option<f64>,
}

impl Bound {
    /// Validated constructor.
    ///
    /// # Errors
    /// - [`OptError::InvalidBound`] if `low` is not finite, `high` is not
    ///   finite, or `high <= low`. The reported index is `0`; use
    ///   [`BoxBounds::from_pairs`] to get positional errors.
    pub fn new(low: f64, high: Option<f64>) -> OptResult<Self> {
        check_bound(0, low, high)?;
        Ok(Self { low, high })
    }

    /// `(low, high)` closed box.
    pub fn closed(low: f64, high: f64) -> OptResult<Self> {
        Self::new(low, Some(high))
    }

    /// `(low, ∞)` half-open box.
    pub fn lower(low: f64) -> OptResult<Self> {
        Self::new(low, None)
    }

    /// Whether `x` lies in the (inclusive) interval.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.low && self.high.is_none_or(|h| x <= h)
    }

    /// Clamp `x` into the interval.
    pub fn project(&self, x: f64) -> f64 {
        let x = x.max(self.low);
        match self.high {
            Some(high) => x.min(high),
            None => x,
        }
    }

    /// Box width, or `max(|low|, 1)` when unbounded above.
    fn scale(&self) -> f64 {
        match self.high {
            Some(high) => high - self.low,
            None => self.low.abs().max(1.0),
        }
    }

    /// Component of the projected gradient of a cost at `x`.
    ///
    /// A descent step `-g` that would push an active coordinate out of the
    /// box is blocked, so that component is zero.
    fn projected_component(&self, x: f64, g: f64) -> f64 {
        let tol = ACTIVE_TOL * self.scale();
        let at_low = x - self.low <= tol;
        let at_high = self.high.is_some_and(|h| h - x <= tol);
        if (at_low && g > 0.0) || (at_high && g < 0.0) { 0.0 } else { g }
    }

    fn forward(&self, theta: f64) -> f64 {
        match self.high {
            Some(high) => {
                let x = self.low + (high - self.low) * safe_logistic(theta);
                x.clamp(self.low, high)
            }
            None => self.low + safe_softplus(theta),
        }
    }

    fn inverse(&self, x: f64) -> f64 {
        match self.high {
            Some(high) => {
                let u = ((x - self.low) / (high - self.low)).clamp(BOUND_MARGIN, 1.0 - BOUND_MARGIN);
                safe_logit(u)
            }
            None => safe_softplus_inv((x - self.low).max(BOUND_MARGIN * self.low.abs().max(1.0))),
        }
    }

    fn derivative(&self, theta: f64) -> f64 {
        let s = safe_logistic(theta);
        match self.high {
            Some(high) => (high - self.low) * s * (1.0 - s),
            None => s,
        }
    }
}

/// Per-coordinate bounds for a whole parameter vector.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxBounds {
    bounds: Vec<Bound>,
}

impl BoxBounds {
    /// Build from already validated [`Bound`]s.
    pub fn new(bounds: Vec<Bound>) -> Self {
        Self { bounds }
    }

    /// Build from raw `(low, high)` pairs, validating each one.
    ///
    /// # Errors
    /// - [`OptError::InvalidBound`] naming the first malformed pair.
    pub fn from_pairs(pairs: &[(f64, Option<f64>)]) -> OptResult<Self> {
        let mut bounds = Vec::with_capacity(pairs.len());
        for (index, &(low, high)) in pairs.iter().enumerate() {
            check_bound(index, low, high)?;
            bounds.push(Bound { low, high });
        }
        Ok(Self { bounds })
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn as_slice(&self) -> &[Bound] {
        &self.bounds
    }

    /// Map a free vector `θ` into the box.
    ///
    /// The caller guarantees `theta.len() == self.len()` (checked once in
    /// [`BoxBounds::check_dim`] before optimization starts).
    pub fn to_constrained(&self, theta: &Theta) -> Theta {
        Theta::from_iter(self.bounds.iter().zip(theta.iter()).map(|(b, &t)| b.forward(t)))
    }

    /// Map a point of the box to free space, pulling it into the interior
    /// first when it sits on or beyond a bound.
    ///
    /// # Errors
    /// - [`OptError::BoundsDimMismatch`] if `x.len() != self.len()`.
    /// - [`OptError::InvalidThetaHat`] if `x` has a non-finite entry.
    pub fn to_unconstrained(&self, x: &Theta) -> OptResult<Theta> {
        self.check_dim(x.len())?;
        for (index, &value) in x.iter().enumerate() {
            if !value.is_finite() {
                return Err(OptError::InvalidThetaHat {
                    index,
                    value,
                    reason: "Starting values must be finite.",
                });
            }
        }
        Ok(Theta::from_iter(self.bounds.iter().zip(x.iter()).map(|(b, &v)| b.inverse(v))))
    }

    /// Diagonal of the Jacobian `dx/dθ` at `θ`.
    pub fn jacobian_diag(&self, theta: &Theta) -> Theta {
        Theta::from_iter(self.bounds.iter().zip(theta.iter()).map(|(b, &t)| b.derivative(t)))
    }

    /// Clamp every coordinate of a model-space point into its interval.
    pub fn project(&self, x: &Theta) -> Theta {
        Theta::from_iter(self.bounds.iter().zip(x.iter()).map(|(b, &v)| b.project(v)))
    }

    /// Projected gradient of a cost at the model-space point `x`.
    ///
    /// `grad` is `∇c(x)` in model space. Components pointing out of the box
    /// at an active bound are zeroed; the rest pass through. `x` is a
    /// first-order (KKT) point of the box-constrained problem exactly when
    /// the result vanishes.
    pub fn projected_gradient(&self, x: &Theta, grad: &Theta) -> Theta {
        Theta::from_iter(
            self.bounds
                .iter()
                .zip(x.iter().zip(grad.iter()))
                .map(|(b, (&v, &g))| b.projected_component(v, g)),
        )
    }

    /// Whether every coordinate of `x` lies in its interval.
    pub fn contains(&self, x: &Theta) -> bool {
        x.len() == self.len() && self.bounds.iter().zip(x.iter()).all(|(b, &v)| b.contains(v))
    }

    /// # Errors
    /// - [`OptError::BoundsDimMismatch`] if `dim != self.len()`.
    pub fn check_dim(&self, dim: usize) -> OptResult<()> {
        if dim != self.len() {
            return Err(OptError::BoundsDimMismatch { expected: self.len(), found: dim });
        }
        Ok(())
    }
}

fn check_bound(index: usize, low: f64, high: Option<f64>) -> OptResult<()> {
    if !low.is_finite() {
        return Err(OptError::InvalidBound {
            index,
            low,
            high,
            reason: "Lower bound must be finite.",
        });
    }
    if let Some(h) = high {
        if !h.is_finite() {
            return Err(OptError::InvalidBound {
                index,
                low,
                high,
                reason: "Upper bound must be finite when present.",
            });
        }
        if h <= low {
            return Err(OptError::InvalidBound {
                index,
                low,
                high,
                reason: "Upper bound must exceed the lower bound.",
            });
        }
    }
    Ok(())
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
    // - Validation of individual bounds and positional error reporting.
    // - Containment of the forward map for arbitrary θ.
    // - Round trips for interior points and the interior pull for points on
    //   a bound.
    //
    // They intentionally DO NOT cover:
    // - Optimizer behavior under the reparameterization (see `api` tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Inverted or non-finite bounds are rejected with the offending index.
    //
    // Given
    // -----
    // - A pair list whose second entry has `high < low`.
    //
    // Expect
    // ------
    // - `OptError::InvalidBound { index: 1, .. }`.
    fn from_pairs_reports_index_of_inverted_bound() {
        // Arrange
        let pairs = [(0.0, Some(1.0)), (1.0, Some(0.5))];

        // Act
        let result = BoxBounds::from_pairs(&pairs);

        // Assert
        match result {
            Err(OptError::InvalidBound { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidBound, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // The forward map never leaves the box, whatever θ the solver proposes.
    //
    // Given
    // -----
    // - A closed box (1e-6, 1) and a half-open box (1e-6, ∞).
    // - θ values from -1e6 to 1e6.
    //
    // Expect
    // ------
    // - Every mapped value is contained in its bound.
    fn to_constrained_stays_inside_for_extreme_theta() {
        // Arrange
        let bounds = BoxBounds::from_pairs(&[(1e-6, Some(1.0)), (1e-6, None)])
            .expect("bounds should be valid");

        for &t in &[-1e6, -50.0, -1.0, 0.0, 1.0, 50.0, 1e6] {
            // Act
            let x = bounds.to_constrained(&array![t, t]);

            // Assert
            assert!(bounds.contains(&x), "θ = {t} mapped outside the box: {x:?}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Interior points survive a round trip through free space.
    //
    // Given
    // -----
    // - Points strictly inside a mix of closed and half-open boxes.
    //
    // Expect
    // ------
    // - `to_constrained(to_unconstrained(x)) ≈ x`.
    fn round_trip_recovers_interior_points() {
        // Arrange
        let bounds = BoxBounds::from_pairs(&[(-10.0, Some(10.0)), (0.01, Some(0.999)), (1e-6, None)])
            .expect("bounds should be valid");
        let x = array![0.3, 0.95, 2.5];

        // Act
        let theta = bounds.to_unconstrained(&x).expect("interior point should map");
        let back = bounds.to_constrained(&theta);

        // Assert
        for (a, b) in back.iter().zip(x.iter()) {
            assert_relative_eq!(a, b, max_relative = 1e-9);
        }
    }

    #[test]
    // Purpose
    // -------
    // A starting point that sits exactly on a bound is pulled into the
    // interior so the solver has a non-zero Jacobian to work with.
    //
    // Given
    // -----
    // - x = low for a closed box.
    //
    // Expect
    // ------
    // - The mapped-back point is strictly greater than `low` and the
    //   Jacobian entry is strictly positive.
    fn to_unconstrained_pulls_boundary_points_inside() {
        // Arrange
        let bounds = BoxBounds::from_pairs(&[(1e-6, Some(1.0))]).expect("bounds should be valid");
        let x = array![1e-6];

        // Act
        let theta = bounds.to_unconstrained(&x).expect("boundary point should map");
        let back = bounds.to_constrained(&theta);
        let jac = bounds.jacobian_diag(&theta);

        // Assert
        assert!(theta[0].is_finite());
        assert!(back[0] > 1e-6);
        assert!(jac[0] > 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Pulling a start off its bound barely moves it, for closed and
    // half-open boxes alike.
    //
    // Given
    // -----
    // - x = low = 1e-6 for a closed box (1e-6, 1) and a half-open box
    //   (1e-6, ∞).
    //
    // Expect
    // ------
    // - Both mapped-back values lie within 1e-8 of 1e-6.
    fn to_unconstrained_moves_boundary_starts_negligibly() {
        // Arrange
        let bounds = BoxBounds::from_pairs(&[(1e-6, Some(1.0)), (1e-6, None)])
            .expect("bounds should be valid");
        let x = array![1e-6, 1e-6];

        // Act
        let theta = bounds.to_unconstrained(&x).expect("boundary point should map");
        let back = bounds.to_constrained(&theta);

        // Assert
        for v in back.iter() {
            assert!(*v > 1e-6 && *v - 1e-6 < 1e-8, "start moved to {v}");
        }
    }

    #[test]
    // Purpose
    // -------
    // The projected gradient zeroes components blocked by an active bound
    // and keeps those that point into the box.
    //
    // Given
    // -----
    // - Closed boxes (0, 1) with x = [0, 1, 1, 0.5].
    // - Cost gradient g = [2, -3, 4, 5].
    //
    // Expect
    // ------
    // - [0, 0, 4, 5]: the first two are blocked, the third points inward
    //   from the upper bound, the fourth is free.
    fn projected_gradient_blocks_outward_components() {
        // Arrange
        let bounds = BoxBounds::from_pairs(&[(0.0, Some(1.0)); 4]).expect("bounds should be valid");
        let x = array![0.0, 1.0, 1.0, 0.5];
        let g = array![2.0, -3.0, 4.0, 5.0];

        // Act
        let pg = bounds.projected_gradient(&x, &g);

        // Assert
        assert_eq!(pg, array![0.0, 0.0, 4.0, 5.0]);
    }

    #[test]
    // Purpose
    // -------
    // `project` clamps into the box and leaves interior points alone.
    //
    // Given
    // -----
    // - Bounds (0, 1) and (1e-6, ∞); x = [1.5, -2.0] and [0.3, 7.0].
    //
    // Expect
    // ------
    // - [1, 1e-6] and the interior point unchanged.
    fn project_clamps_into_the_box() {
        // Arrange
        let bounds = BoxBounds::from_pairs(&[(0.0, Some(1.0)), (1e-6, None)])
            .expect("bounds should be valid");

        // Act
        let outside = bounds.project(&array![1.5, -2.0]);
        let inside = bounds.project(&array![0.3, 7.0]);

        // Assert
        assert_eq!(outside, array![1.0, 1e-6]);
        assert_eq!(inside, array![0.3, 7.0]);
    }

    #[test]
    // Purpose
    // -------
    // Dimension mismatches are caught before optimization starts.
    //
    // Given
    // -----
    // - Two bounds and a three-element starting point.
    //
    // Expect
    // ------
    // - `OptError::BoundsDimMismatch { expected: 2, found: 3 }`.
    fn to_unconstrained_rejects_dimension_mismatch() {
        // Arrange
        let bounds = BoxBounds::from_pairs(&[(0.0, Some(1.0)), (0.0, Some(1.0))])
            .expect("bounds should be valid");

        // Act
        let result = bounds.to_unconstrained(&array![0.5, 0.5, 0.5]);

        // Assert
        assert_eq!(result, Err(OptError::BoundsDimMismatch { expected: 2, found: 3 }));
    }
}
