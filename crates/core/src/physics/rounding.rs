//! Rounding policy and methodology constants
//!
//! The methodology chains its formulas on values rounded to three decimals:
//! every stage rounds what it computes and later stages consume the rounded
//! number. Reproducing published worked solutions depends on doing the same.

/// Decimal places kept for every computed quantity
pub const DECIMALS: usize = 3;

/// π as written in the methodology's formulas (and implied by 0.785 = π/4)
#[allow(
    clippy::approx_constant,
    reason = "The methodology tables are computed with pi = 3.14"
)]
pub const METHODOLOGY_PI: f64 = 3.14;

/// Round to [`DECIMALS`] places.
///
/// Decides on the exact binary value, so `0.785 * 1.5` (stored just below
/// 1.1775) rounds to 1.177. Scaling by 1000 first would round the product
/// up to 1177.5 and give 1.178. Non-finite values pass through.
#[inline]
pub fn round3(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.DECIMALS$}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.3652), 0.365);
        assert_eq!(round3(0.0995222), 0.1);
        assert_eq!(round3(19.97452), 19.975);
        assert_eq!(round3(-1.23456), -1.235);
        assert_eq!(round3(142.5), 142.5);
    }

    #[test]
    fn test_round3_uses_exact_binary_value() {
        assert_eq!(round3(0.785 * 1.5), 1.177);
        assert_eq!(round3(1.0005), 1.0);
        assert_eq!(round3(2.0005), 2.001);
    }

    #[test]
    fn test_non_finite_passes_through() {
        assert!(round3(f64::NAN).is_nan());
        assert_eq!(round3(f64::INFINITY), f64::INFINITY);
    }
}
