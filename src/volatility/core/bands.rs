//! Confidence bands around a volatility path.
//!
//! Two methods:
//! - `Normal`: `center ∓ z·spread` element-wise.
//! - `Bootstrap`: one empirical offset `q = quantile(spread, 0.975)`
//!   (linear interpolation between order statistics), `center ∓ q`.
//!
//! The lower band is clipped at zero; the upper band never is. Inputs are
//! validated (equal lengths, finite `z >= 0`, finite `spread >= 0`) so that
//! `lower <= center <= upper` holds for any non-negative center.
use std::str::FromStr;

use ndarray::Array1;

use crate::volatility::errors::{VolError, VolResult};

/// Default normal critical value (≈ 95% two-sided).
pub const DEFAULT_Z: f64 = 1.96;

/// Quantile level of the bootstrap offset.
pub const BOOTSTRAP_LEVEL: f64 = 0.975;

/// Band construction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandMethod {
    #[default]
    Normal,
    Bootstrap,
}

impl FromStr for BandMethod {
    type Err = VolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(BandMethod::Normal),
            "bootstrap" => Ok(BandMethod::Bootstrap),
            _ => Err(VolError::UnknownBandMethod { name: s.to_string() }),
        }
    }
}

impl std::fmt::Display for BandMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BandMethod::Normal => write!(f, "normal"),
            BandMethod::Bootstrap => write!(f, "bootstrap"),
        }
    }
}

/// Lower and upper bands for `center` with the given `spread`.
///
/// # Errors
/// - [`VolError::BandLengthMismatch`] if the lengths differ.
/// - [`VolError::InvalidCriticalValue`] if `z` is negative or non-finite.
/// - [`VolError::InvalidSpread`] for a negative or non-finite spread entry.
pub fn confidence_bands(
    center: &Array1<f64>, spread: &Array1<f64>, method: BandMethod, z: f64,
) -> VolResult<(Array1<f64>, Array1<f64>)> {
    if center.len() != spread.len() {
        return Err(VolError::BandLengthMismatch { center: center.len(), spread: spread.len() });
    }
    if !z.is_finite() || z < 0.0 {
        return Err(VolError::InvalidCriticalValue { z });
    }
    if let Some((index, &value)) = spread.iter().enumerate().find(|(_, v)| !(v.is_finite() && **v >= 0.0)) {
        return Err(VolError::InvalidSpread { index, value });
    }
    if center.is_empty() {
        return Ok((Array1::zeros(0), Array1::zeros(0)));
    }

    let offset = match method {
        BandMethod::Normal => spread.mapv(|s| z * s),
        BandMethod::Bootstrap => Array1::from_elem(center.len(), quantile(spread, BOOTSTRAP_LEVEL)),
    };
    let lower = (center - &offset).mapv(|v| v.max(0.0));
    let upper = center + &offset;
    Ok((lower, upper))
}

/// Empirical quantile with linear interpolation between order statistics.
///
/// `level` is clamped to `[0, 1]`; returns `NaN` for an empty input.
pub fn quantile(values: &Array1<f64>, level: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = level.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
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
    // - Method parsing and the two band shapes.
    // - Clipping of the lower band at zero.
    // - Input validation.
    //
    // Ordering invariants over random inputs live in the integration suite
    // (proptest).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Method tokens parse case-insensitively; anything else is rejected.
    //
    // Given
    // -----
    // - "Normal", "BOOTSTRAP", "student".
    //
    // Expect
    // ------
    // - Two methods and `UnknownBandMethod`.
    fn band_method_parses_known_tokens() {
        assert_eq!("Normal".parse::<BandMethod>(), Ok(BandMethod::Normal));
        assert_eq!("BOOTSTRAP".parse::<BandMethod>(), Ok(BandMethod::Bootstrap));
        assert_eq!(
            "student".parse::<BandMethod>(),
            Err(VolError::UnknownBandMethod { name: "student".to_string() })
        );
    }

    #[test]
    // Purpose
    // -------
    // Normal bands are `center ∓ z·spread` with the lower band clipped.
    //
    // Given
    // -----
    // - center [1, 0.1], spread [0.1, 0.1], z = 2.
    //
    // Expect
    // ------
    // - lower [0.8, 0], upper [1.2, 0.3].
    fn normal_bands_scale_spread_and_clip_lower() {
        // Act
        let (lower, upper) = confidence_bands(&array![1.0, 0.1], &array![0.1, 0.1], BandMethod::Normal, 2.0)
            .expect("bands should build");

        // Assert
        assert_relative_eq!(lower[0], 0.8, epsilon = 1e-12);
        assert_eq!(lower[1], 0.0);
        assert_relative_eq!(upper[0], 1.2, epsilon = 1e-12);
        assert_relative_eq!(upper[1], 0.3, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Bootstrap bands use the interpolated 97.5% quantile of the spread as
    // one offset for every point.
    //
    // Given
    // -----
    // - spread [0, 1, 2, 3, 4] (quantile at position 3.9 → 3.9).
    //
    // Expect
    // ------
    // - upper = center + 3.9 everywhere.
    fn bootstrap_bands_use_interpolated_quantile() {
        // Arrange
        let center = array![10.0, 10.0, 10.0, 10.0, 10.0];
        let spread = array![4.0, 0.0, 2.0, 1.0, 3.0];

        // Act
        let (lower, upper) =
            confidence_bands(&center, &spread, BandMethod::Bootstrap, DEFAULT_Z).expect("bands should build");

        // Assert
        for (l, u) in lower.iter().zip(upper.iter()) {
            assert_relative_eq!(*u, 13.9, epsilon = 1e-12);
            assert_relative_eq!(*l, 6.1, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Malformed inputs are rejected.
    //
    // Given
    // -----
    // - Mismatched lengths, z = -1, and a negative spread.
    //
    // Expect
    // ------
    // - The matching validation errors.
    fn confidence_bands_validate_inputs() {
        let c = array![1.0, 1.0];
        assert_eq!(
            confidence_bands(&c, &array![0.1], BandMethod::Normal, 1.96),
            Err(VolError::BandLengthMismatch { center: 2, spread: 1 })
        );
        assert_eq!(
            confidence_bands(&c, &array![0.1, 0.1], BandMethod::Normal, -1.0),
            Err(VolError::InvalidCriticalValue { z: -1.0 })
        );
        assert_eq!(
            confidence_bands(&c, &array![0.1, -0.1], BandMethod::Bootstrap, 1.96),
            Err(VolError::InvalidSpread { index: 1, value: -0.1 })
        );
    }
}
