//! models — the seven GARCH-family variance models and runtime selection.
//!
//! Each variant lives in its own module, implements
//! [`VarianceModel`], and exposes a free
//! `*_log_likelihood(params, returns, orders)` /
//! `estimate_*_params(returns, orders, opts)` pair. [`ModelSpec`] is the
//! tagged enum used when the variant is only known at runtime (e.g. from
//! Python); it dispatches to the matching implementation.
use std::str::FromStr;

use ndarray::Array1;

use crate::volatility::{
    core::{
        data::ReturnSeries,
        estimation::estimate,
        likelihood::log_likelihood,
        options::FitOptions,
        orders::{HarchLags, Orders},
        results::FitResult,
        state::VarianceState,
        variance_model::VarianceModel,
    },
    errors::{VolError, VolResult},
};

pub mod component_garch;
pub mod egarch;
pub mod garch;
pub mod garch_in_mean;
pub mod gjr_garch;
pub mod harch;
pub mod stochastic_volatility;

pub use self::component_garch::{
    ComponentGarch, ComponentGarchParams, component_garch_log_likelihood, estimate_component_garch_params,
};
pub use self::egarch::{Egarch, EgarchParams, egarch_log_likelihood, estimate_egarch_params};
pub use self::garch::{Garch, GarchParams, estimate_garch_params, garch_log_likelihood, garch_volatility};
pub use self::garch_in_mean::{
    GarchInMean, GarchInMeanParams, estimate_garch_in_mean_params, garch_in_mean_log_likelihood,
};
pub use self::gjr_garch::{GjrGarch, GjrGarchParams, estimate_gjr_garch_params, gjr_garch_log_likelihood};
pub use self::harch::{Harch, HarchParams, estimate_harch_params, harch_log_likelihood};
pub use self::stochastic_volatility::{SvParams, StochasticVolatility, estimate_sv_params, sv_log_likelihood};

/// Variant tag with its orders or lag-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSpec {
    Garch(Orders),
    GjrGarch(Orders),
    Egarch(Orders),
    ComponentGarch,
    GarchInMean(Orders),
    Harch(HarchLags),
    StochasticVolatility,
}

/// Bind the concrete model for `$spec` to `$m` and evaluate `$body`.
macro_rules! with_model {
    ($spec:expr, $m:ident => $body:expr) => {
        match $spec {
            ModelSpec::Garch(o) => {
                let $m = Garch::new(*o);
                $body
            }
            ModelSpec::GjrGarch(o) => {
                let $m = GjrGarch::new(*o);
                $body
            }
            ModelSpec::Egarch(o) => {
                let $m = Egarch::new(*o);
                $body
            }
            ModelSpec::ComponentGarch => {
                let $m = ComponentGarch;
                $body
            }
            ModelSpec::GarchInMean(o) => {
                let $m = GarchInMean::new(*o);
                $body
            }
            ModelSpec::Harch(lags) => {
                let $m = Harch::new(lags.clone());
                $body
            }
            ModelSpec::StochasticVolatility => {
                let $m = StochasticVolatility;
                $body
            }
        }
    };
}

impl ModelSpec {
    /// Build a spec from a variant name and its orders or lags.
    ///
    /// Names are case-insensitive; `-` and `_` are interchangeable.
    /// `p`/`q` are used by the GARCH-type variants, `lags` by HARCH
    /// (defaulting to `[1, 5, 22]`); other arguments are ignored.
    ///
    /// # Errors
    /// - [`VolError::UnknownModel`] for an unrecognized name.
    /// - [`VolError::InvalidOrder`] / [`VolError::InvalidLags`] from the
    ///   order and lag validators.
    pub fn from_name(name: &str, p: usize, q: usize, lags: Option<Vec<usize>>) -> VolResult<Self> {
        match name.parse::<ModelKind>()? {
            ModelKind::Garch => Ok(ModelSpec::Garch(Orders::new(p, q)?)),
            ModelKind::GjrGarch => Ok(ModelSpec::GjrGarch(Orders::new(p, q)?)),
            ModelKind::Egarch => Ok(ModelSpec::Egarch(Orders::new(p, q)?)),
            ModelKind::ComponentGarch => Ok(ModelSpec::ComponentGarch),
            ModelKind::GarchInMean => Ok(ModelSpec::GarchInMean(Orders::new(p, q)?)),
            ModelKind::Harch => {
                let lags = match lags {
                    Some(l) => HarchLags::new(l)?,
                    None => HarchLags::default(),
                };
                Ok(ModelSpec::Harch(lags))
            }
            ModelKind::StochasticVolatility => Ok(ModelSpec::StochasticVolatility),
        }
    }

    pub fn name(&self) -> String {
        with_model!(self, m => m.name())
    }

    pub fn param_names(&self) -> Vec<String> {
        with_model!(self, m => m.param_names())
    }

    pub fn n_params(&self) -> usize {
        with_model!(self, m => m.n_params())
    }

    pub fn initial_guess(&self) -> Array1<f64> {
        with_model!(self, m => m.initial_guess())
    }

    pub fn bound_pairs(&self) -> Vec<(f64, Option<f64>)> {
        with_model!(self, m => m.bound_pairs())
    }

    /// Negative log-likelihood cost; see
    /// [`log_likelihood`](crate::volatility::core::likelihood::log_likelihood).
    pub fn log_likelihood(&self, params: &[f64], returns: &ReturnSeries) -> VolResult<f64> {
        with_model!(self, m => log_likelihood(&m, params, returns))
    }

    /// Fit the variant; see [`estimate`](crate::volatility::core::estimation::estimate).
    pub fn estimate(&self, returns: &ReturnSeries, opts: &FitOptions) -> VolResult<FitResult> {
        with_model!(self, m => estimate(&m, returns, opts))
    }

    /// Volatility forecast from a fitted state and flat parameters.
    pub fn forecast(&self, params: &[f64], state: &VarianceState, steps: usize) -> VolResult<Array1<f64>> {
        with_model!(self, m => {
            let unpacked = m.unpack(params)?;
            m.forecast(&unpacked, state, steps)
        })
    }
}

impl std::fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Variant names accepted by [`ModelSpec::from_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelKind {
    Garch,
    GjrGarch,
    Egarch,
    ComponentGarch,
    GarchInMean,
    Harch,
    StochasticVolatility,
}

impl FromStr for ModelKind {
    type Err = VolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "garch" => Ok(ModelKind::Garch),
            "gjr_garch" | "gjr" => Ok(ModelKind::GjrGarch),
            "egarch" => Ok(ModelKind::Egarch),
            "component_garch" | "cgarch" => Ok(ModelKind::ComponentGarch),
            "garch_in_mean" | "garch_m" => Ok(ModelKind::GarchInMean),
            "harch" => Ok(ModelKind::Harch),
            "stochastic_volatility" | "sv" => Ok(ModelKind::StochasticVolatility),
            _ => Err(VolError::UnknownModel { name: s.to_string() }),
        }
    }
}
