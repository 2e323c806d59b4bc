//! optimization — MLE stack, bound transforms, and unified error surface.
//!
//! Purpose
//! -------
//! Fit model parameters by maximum likelihood without exposing backend
//! solver details: callers implement a log-likelihood, pick tolerances and
//! a line search, optionally supply box bounds, and get back fitted
//! parameters with convergence diagnostics.
//!
//! Key behaviors
//! -------------
//! - `loglik_optimizer`: argmin L-BFGS wrapped behind `maximize_bounded`,
//!   with a divergence penalty, a best-point fallback when the backend
//!   fails, and a projected-gradient check of every solver stop.
//! - `numerical_stability`: overflow-safe logistic/softplus transforms used
//!   to express box bounds as a smooth reparameterization.
//! - `errors`: one enum (`OptError`) and alias (`OptResult<T>`) for
//!   configuration mistakes, bound problems, backend failures and model
//!   validation errors.
//!
//! Invariants & assumptions
//! ------------------------
//! - Solvers maximize `ℓ` by minimizing `c = -ℓ`; user-facing outcomes are
//!   expressed in `ℓ`.
//! - A non-finite `ℓ` marks an inadmissible point, not an error.
//! - Invalid configuration is reported as `OptError`, never as a panic.
//!
//! Conventions
//! -----------
//! - Parameters and gradients use the `ndarray` aliases `Theta` / `Grad`.
//! - Diagnostic output goes through the `log` facade; the `obs_slog`
//!   feature additionally attaches argmin's slog observer when a run is
//!   verbose.
//!
//! Downstream usage
//! ----------------
//! - The `volatility` module implements `LogLikelihood` for its variance
//!   models and calls `maximize_bounded` with each model's parameter box.
//! - Front-ends can import `optimization::prelude::*`.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_volatility::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
