//! Model orders for GARCH-family variance recursions.
//!
//! Convention (Bollerslev):
//! - `p`: number of **variance lags** (coefficients β₁…β_p on past σ²).
//! - `q`: number of **shock lags** (coefficients α₁…α_q on past ε²).
//!
//! `p` must be at least 1 (initial guesses spread the persistence 0.9 evenly
//! across the β terms). `q` may be zero.
//!
//! HARCH replaces orders with a lag-set: one averaging window per lag.
use crate::volatility::errors::{VolError, VolResult};

/// Orders `(p, q)` of a GARCH-type model.
///
/// Invariant: `p >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orders {
    pub p: usize,
    pub q: usize,
}

impl Orders {
    /// Construct validated orders.
    ///
    /// # Errors
    /// - [`VolError::InvalidOrder`] if `p == 0`.
    pub fn new(p: usize, q: usize) -> VolResult<Self> {
        if p == 0 {
            return Err(VolError::InvalidOrder {
                p,
                q,
                reason: "p must be at least 1.",
            });
        }
        Ok(Self { p, q })
    }

    /// Number of pre-sample entries seeded from the sample variance.
    pub fn burn_in(&self) -> usize {
        self.p.max(self.q)
    }
}

impl Default for Orders {
    /// GARCH(1,1).
    fn default() -> Self {
        Self { p: 1, q: 1 }
    }
}

impl std::fmt::Display for Orders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.p, self.q)
    }
}

/// HARCH lag-set.
///
/// Each lag `l` contributes the mean of the last `l` squared returns.
/// Invariant: non-empty, every lag `>= 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarchLags {
    lags: Vec<usize>,
}

impl HarchLags {
    /// Construct a validated lag-set.
    ///
    /// # Errors
    /// - [`VolError::InvalidLags`] if `lags` is empty or contains a zero.
    pub fn new(lags: Vec<usize>) -> VolResult<Self> {
        if lags.is_empty() {
            return Err(VolError::InvalidLags { lags, reason: "At least one lag is required." });
        }
        if lags.contains(&0) {
            return Err(VolError::InvalidLags { lags, reason: "Lags must be strictly positive." });
        }
        Ok(Self { lags })
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.lags
    }

    pub fn len(&self) -> usize {
        self.lags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lags.is_empty()
    }

    /// Longest averaging window.
    pub fn max_lag(&self) -> usize {
        self.lags.iter().copied().max().unwrap_or(0)
    }
}

impl Default for HarchLags {
    /// Daily, weekly and monthly windows.
    fn default() -> Self {
        Self { lags: vec![1, 5, 22] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Order validation and burn-in length.
    // - HARCH lag-set validation.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `p = 0` is rejected while `q = 0` is allowed.
    //
    // Given
    // -----
    // - Orders (0, 1) and (2, 0).
    //
    // Expect
    // ------
    // - `InvalidOrder` for the first; burn-in 2 for the second.
    fn orders_require_positive_p() {
        assert!(matches!(Orders::new(0, 1), Err(VolError::InvalidOrder { p: 0, q: 1, .. })));
        assert_eq!(Orders::new(2, 0).expect("q = 0 is valid").burn_in(), 2);
    }

    #[test]
    // Purpose
    // -------
    // Lag-sets must be non-empty and strictly positive.
    //
    // Given
    // -----
    // - `[]`, `[1, 0]` and `[1, 5, 22]`.
    //
    // Expect
    // ------
    // - Two `InvalidLags` errors and a valid set with `max_lag == 22`.
    fn harch_lags_are_validated() {
        assert!(matches!(HarchLags::new(vec![]), Err(VolError::InvalidLags { .. })));
        assert!(matches!(HarchLags::new(vec![1, 0]), Err(VolError::InvalidLags { .. })));
        let lags = HarchLags::new(vec![1, 5, 22]).expect("lags should be valid");
        assert_eq!(lags.max_lag(), 22);
        assert_eq!(lags, HarchLags::default());
    }
}
