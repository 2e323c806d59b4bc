//! statistical_tests — residual diagnostics for fitted volatility models.
//!
//! Purpose
//! -------
//! Collect statistical-test routines used to check fitted models, together
//! with their shared validation and error handling. This subtree currently
//! implements the Ljung–Box portmanteau test.
//!
//! Key behaviors
//! -------------
//! - Expose the Ljung–Box test via [`LBOutcome`] and its constructor
//!   [`LBOutcome::ljung_box`](ljung_box::LBOutcome::ljung_box).
//! - Centralize input guards in [`validate_input`].
//! - Provide [`LBError`] / [`LBResult`], with a conversion to Python
//!   exceptions when the `python-bindings` feature is enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite, real-valued series (usually standardized
//!   residuals); invalid inputs are reported via [`LBResult`], never by
//!   panicking.
//! - At the Python boundary every [`LBError`] becomes a `ValueError` with
//!   the `Display` message preserved.
//!
//! Downstream usage
//! ----------------
//! - Typical Rust code:
//!
//!   ```rust
//!   use rust_volatility::statistical_tests::LBOutcome;
//!
//!   let residuals = vec![0.2, -0.4, 0.1, 0.3, -0.2, 0.05, -0.1];
//!   let outcome = LBOutcome::ljung_box(&residuals, 3).expect("valid input");
//!   assert!((0.0..=1.0).contains(&outcome.p_value()));
//!   ```
//!
//! Testing notes
//! -------------
//! - [`errors`] checks messages, [`validation`] every guard branch, and
//!   [`ljung_box`] the statistic and p-value on hand-computed series.

pub mod errors;
pub mod ljung_box;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{LBError, LBResult};
pub use self::ljung_box::LBOutcome;
pub use self::validation::validate_input;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_volatility::statistical_tests::prelude::*;
//
// to import the main statistical-testing surface in a single line.

pub mod prelude {
    pub use super::errors::{LBError, LBResult};
    pub use super::ljung_box::LBOutcome;
}
