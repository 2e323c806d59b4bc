//! Variance-recursion state and divergence guard.
//!
//! Purpose
//! -------
//! Carry the output of one variance recursion ([`VarianceState`]) and the
//! per-step admissibility check every recursion applies ([`VarianceGuard`]).
//!
//! Key behaviors
//! -------------
//! - In [`RecursionMode::Strict`] the guard returns a [`Divergence`] the
//!   first time a variance is zero, negative or non-finite, and the caller
//!   stops recursing (`?`).
//! - In [`RecursionMode::Lenient`] the guard records the first divergence
//!   and lets the recursion run to the end. This mode is only used to build
//!   the reported fitted path after optimization.
//!
//! Invariants & assumptions
//! ------------------------
//! - `sigma2`, `residuals` (and `aux` when present) have the series length.
//! - A strict-mode state always has `divergence == None` and every
//!   `sigma2[t] > 0` finite.
//!
//! Conventions
//! -----------
//! - `aux` holds the permanent component `q` for Component-GARCH and the
//!   conditional mean `μ + λσ` for GARCH-in-Mean; `None` otherwise.
//! - For EGARCH the guard sees `exp(log σ²)`, so underflow to zero and
//!   overflow to `∞` both count as divergence.
use ndarray::Array1;

use crate::volatility::errors::Divergence;

/// How a recursion reacts to an inadmissible variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionMode {
    /// Abort at the first inadmissible variance.
    Strict,
    /// Record the first inadmissible variance and keep going.
    Lenient,
}

/// Output of one variance recursion.
#[derive(Debug, Clone, PartialEq)]
pub struct VarianceState {
    /// Conditional variance per time index.
    pub sigma2: Array1<f64>,
    /// Residuals that entered the likelihood.
    pub residuals: Array1<f64>,
    /// Auxiliary path (permanent component or conditional mean).
    pub aux: Option<Array1<f64>>,
    /// First divergence seen in lenient mode.
    pub divergence: Option<Divergence>,
}

impl VarianceState {
    pub fn len(&self) -> usize {
        self.sigma2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sigma2.is_empty()
    }

    /// `true` when no divergence was recorded.
    pub fn is_valid(&self) -> bool {
        self.divergence.is_none()
    }

    /// Conditional volatility `sqrt(σ²)`. Negative variances map to `NaN`.
    pub fn volatility(&self) -> Array1<f64> {
        self.sigma2.mapv(f64::sqrt)
    }
}

/// Per-step admissibility check shared by all recursions.
#[derive(Debug, Clone)]
pub struct VarianceGuard {
    mode: RecursionMode,
    first: Option<Divergence>,
}

impl VarianceGuard {
    pub fn new(mode: RecursionMode) -> Self {
        Self { mode, first: None }
    }

    /// Check that `value` is a usable variance.
    ///
    /// # Errors
    /// - In strict mode, a [`Divergence`] at `index` if `value` is not
    ///   strictly positive and finite.
    pub fn check(&mut self, index: usize, value: f64) -> Result<(), Divergence> {
        if value.is_finite() && value > 0.0 {
            return Ok(());
        }
        let div = Divergence { index, value };
        match self.mode {
            RecursionMode::Strict => Err(div),
            RecursionMode::Lenient => {
                if self.first.is_none() {
                    self.first = Some(div);
                }
                Ok(())
            }
        }
    }

    /// Assemble the state, attaching the first recorded divergence.
    pub fn finish(
        self, sigma2: Array1<f64>, residuals: Array1<f64>, aux: Option<Array1<f64>>,
    ) -> VarianceState {
        VarianceState { sigma2, residuals, aux, divergence: self.first }
    }
}
