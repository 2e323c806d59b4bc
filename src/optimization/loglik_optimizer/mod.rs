//! loglik_optimizer — argmin-powered maximum-likelihood optimizer.
//!
//! Purpose
//! -------
//! Fit any model that can report a log-likelihood `ℓ(x)` over a box of
//! admissible parameters: callers implement [`LogLikelihood`] and invoke
//! [`maximize_bounded`]. L-BFGS runs with a configurable line search,
//! tolerances, and finite-difference gradients when no analytic gradient is
//! available.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns `ℓ` into the cost `c = -ℓ`, replaces
//!   non-finite values by [`types::DIVERGENCE_COST`], and tracks the best
//!   point evaluated.
//! - [`bounds::BoxBounds`] maps a free solver vector into the box through
//!   logistic (closed) and softplus (half-open) transforms.
//! - [`run::run_lbfgs`] executes the solver and, if the backend fails,
//!   falls back to the best point seen with `converged = false`.
//! - [`refine`] checks every solver stop with the model-space projected
//!   gradient and, when the stop is not a first-order point, refines it by
//!   projected-gradient steps before restarting the solver.
//! - [`builders`] construct the two L-BFGS variants from [`MLEOptions`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer always maximizes `ℓ`; models never implement the cost.
//! - Every `x` passed to [`LogLikelihood::value`] lies in the box, and the
//!   reported [`OptimOutcome::theta_hat`] does too.
//! - `converged == true` implies the projected gradient at `theta_hat`
//!   passed [`refine::is_stationary`].
//! - [`Tolerances`] and [`MLEOptions`] are validated on construction.
//!
//! Conventions
//! -----------
//! - [`OptimOutcome::value`] is expressed as `ℓ`, not as the cost.
//! - Errors bubble up as [`OptResult<T>`](crate::optimization::errors::OptResult);
//!   nothing in this module panics on bad input.
//!
//! Downstream usage
//! ----------------
//! - `volatility::core::likelihood::VarianceObjective` implements
//!   [`LogLikelihood`] for every variance model and is fitted through
//!   [`maximize_bounded`].
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule cover sign conventions, the divergence
//!   penalty, bound transforms, FD fallbacks, option validation, the
//!   stationarity test, and bounded toy maximizations including a start on
//!   a corner of the box.
//! - The integration suite exercises the optimizer end to end by fitting
//!   every variance model.

pub mod adapter;
pub mod api;
pub mod bounds;
pub mod builders;
pub mod finite_diff;
pub mod refine;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{MAX_BOUND_RESTARTS, maximize_bounded};
pub use self::bounds::{Bound, BoxBounds};
pub use self::refine::{KKT_TOL, Refinement};
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, DIVERGENCE_COST, FnEvalMap, Grad, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_volatility::optimization::loglik_optimizer::prelude::*;
//
// to import the main optimizer surface in a single line.

pub mod prelude {
    pub use super::api::maximize_bounded;
    pub use super::bounds::{Bound, BoxBounds};
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
