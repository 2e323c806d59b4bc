//! The `VarianceModel` trait: one implementation per GARCH-family variant.
//!
//! A variance model bundles everything the shared fitting engine needs to
//! know about a variant:
//! - the flat parameter layout (`param_names`, `unpack`), initial guess and
//!   box bounds;
//! - the variance recursion (`seed`, `recurse`);
//! - the h-step forecast from a fitted state (`forecast`).
//!
//! The likelihood, optimizer wiring, confidence bands and result assembly
//! are written once against this trait (see `likelihood` and `estimation`).
use ndarray::Array1;

use crate::{
    optimization::loglik_optimizer::BoxBounds,
    volatility::{
        core::state::{RecursionMode, VarianceState},
        errors::{Divergence, VolError, VolResult},
        models::ModelSpec,
    },
};

/// Variant-specific pieces of a GARCH-family model.
pub trait VarianceModel {
    /// Unpacked, named parameter groups.
    type Params: Clone + std::fmt::Debug;

    /// Display name including orders, e.g. `"GARCH(1,1)"`.
    fn name(&self) -> String;

    /// One name per scalar of the flat vector, in layout order.
    fn param_names(&self) -> Vec<String>;

    /// Starting point for the optimizer.
    fn initial_guess(&self) -> Array1<f64>;

    /// `(low, high)` per scalar; `high = None` means unbounded above.
    fn bound_pairs(&self) -> Vec<(f64, Option<f64>)>;

    /// Split a flat vector into named groups by fixed offsets.
    ///
    /// Implementations call [`check_params`](Self::check_params) first.
    fn unpack(&self, theta: &[f64]) -> VolResult<Self::Params>;

    /// Working-scale seed for the pre-sample entries.
    fn seed(&self, params: &Self::Params, shocks: &Array1<f64>) -> f64;

    /// Run the recursion over the NaN-as-zero shock series.
    fn recurse(
        &self, params: &Self::Params, shocks: &Array1<f64>, mode: RecursionMode,
    ) -> Result<VarianceState, Divergence>;

    /// `steps`-ahead volatility forecast with zero future shocks.
    fn forecast(
        &self, params: &Self::Params, state: &VarianceState, steps: usize,
    ) -> VolResult<Array1<f64>>;

    /// Runtime tag for this variant.
    fn spec(&self) -> ModelSpec;

    /// Conditional mean path, for variants with a mean equation.
    fn conditional_mean(&self, _state: &VarianceState) -> Option<Array1<f64>> {
        None
    }

    fn n_params(&self) -> usize {
        self.param_names().len()
    }

    /// Parameter box as a [`BoxBounds`].
    ///
    /// # Errors
    /// - [`VolError::Optimizer`] if a bound pair is malformed.
    fn bounds(&self) -> VolResult<BoxBounds> {
        Ok(BoxBounds::from_pairs(&self.bound_pairs())?)
    }

    /// Length and finiteness check shared by every `unpack`.
    ///
    /// # Errors
    /// - [`VolError::ParamLengthMismatch`] if `theta.len() != n_params()`.
    /// - [`VolError::NonFiniteParam`] for the first `NaN`/`±∞` entry.
    fn check_params(&self, theta: &[f64]) -> VolResult<()> {
        let expected = self.n_params();
        if theta.len() != expected {
            return Err(VolError::ParamLengthMismatch {
                model: self.name(),
                expected,
                actual: theta.len(),
            });
        }
        if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(VolError::NonFiniteParam { index, value });
        }
        Ok(())
    }
}
