//! Fitting options for GARCH-family models.
//!
//! Purpose
//! -------
//! Bundle the knobs of one `estimate` call: optimizer configuration
//! ([`MLEOptions`]) and, optionally, how confidence bands around the fitted
//! volatility are produced ([`ConfidenceOptions`]).
//!
//! Key behaviors
//! -------------
//! - [`ConfidenceOptions::new`] validates the standard-error fraction and
//!   critical value; its `Default` is `(0.1, Normal, 1.96)`.
//! - [`FitOptions::default`] fits without bands;
//!   [`FitOptions::with_confidence`] switches on the default bands.
//!
//! Conventions
//! -----------
//! - The band spread is `stderr_fraction · volatility`. This is a
//!   proportional heuristic, not a Hessian-based standard error.
use crate::{
    optimization::loglik_optimizer::MLEOptions,
    volatility::{
        core::bands::{BandMethod, DEFAULT_Z},
        errors::{VolError, VolResult},
    },
};

/// Default fraction of the volatility used as its standard error.
pub const DEFAULT_STDERR_FRACTION: f64 = 0.1;

/// How confidence bands are built after a fit.
///
/// Fields
/// ------
/// - `stderr_fraction`: `f64`
///   Spread per point as a fraction of the fitted volatility (`>= 0`).
/// - `method`: [`BandMethod`]
///   Normal or bootstrap bands.
/// - `z`: `f64`
///   Normal critical value (ignored by the bootstrap method).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceOptions {
    pub stderr_fraction: f64,
    pub method: BandMethod,
    pub z: f64,
}

impl ConfidenceOptions {
    /// Validated constructor.
    ///
    /// # Errors
    /// - [`VolError::InvalidStderrFraction`] if `stderr_fraction` is
    ///   negative or non-finite.
    /// - [`VolError::InvalidCriticalValue`] if `z` is negative or non-finite.
    pub fn new(stderr_fraction: f64, method: BandMethod, z: f64) -> VolResult<Self> {
        if !stderr_fraction.is_finite() || stderr_fraction < 0.0 {
            return Err(VolError::InvalidStderrFraction { value: stderr_fraction });
        }
        if !z.is_finite() || z < 0.0 {
            return Err(VolError::InvalidCriticalValue { z });
        }
        Ok(Self { stderr_fraction, method, z })
    }
}

impl Default for ConfidenceOptions {
    fn default() -> Self {
        Self { stderr_fraction: DEFAULT_STDERR_FRACTION, method: BandMethod::Normal, z: DEFAULT_Z }
    }
}

/// Options for one `estimate` call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FitOptions {
    pub mle_opts: MLEOptions,
    pub confidence: Option<ConfidenceOptions>,
}

impl FitOptions {
    pub fn new(mle_opts: MLEOptions, confidence: Option<ConfidenceOptions>) -> Self {
        Self { mle_opts, confidence }
    }

    /// Default optimizer settings with default confidence bands.
    pub fn with_confidence() -> Self {
        Self { mle_opts: MLEOptions::default(), confidence: Some(ConfidenceOptions::default()) }
    }
}
