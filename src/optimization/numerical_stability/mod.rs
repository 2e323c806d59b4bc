//! numerical_stability — guarded transforms between bounded and free space.
//!
//! Purpose
//! -------
//! Supply the overflow-safe scalar maps the optimizer uses to express box
//! constraints as a smooth reparameterization, so that an unconstrained
//! L-BFGS run can never leave a parameter's `(low, high)` interval.
//!
//! Key behaviors
//! -------------
//! - `safe_logistic` / `safe_logit` map ℝ ↔ (0, 1) for closed boxes.
//! - `safe_softplus` / `safe_softplus_inv` map ℝ ↔ (0, ∞) for half-open
//!   boxes.
//! - `BOUND_MARGIN` keeps starting points off the bounds themselves, where
//!   the inverse maps diverge.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs to the inverse maps are strictly inside their open domains;
//!   callers clamp with `BOUND_MARGIN` first.
//!
//! Downstream usage
//! ----------------
//! - `loglik_optimizer::bounds::BoxBounds` is the only in-crate consumer.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] check agreement with naive formulas,
//!   inverse round trips, and tail behavior.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    BOUND_MARGIN, safe_logistic, safe_logit, safe_softplus, safe_softplus_inv,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_volatility::optimization::numerical_stability::prelude::*;
//
// to import the main numerical-stability surface in a single line.

pub mod prelude {
    pub use super::transformations::{
        BOUND_MARGIN, safe_logistic, safe_logit, safe_softplus, safe_softplus_inv,
    };
}
