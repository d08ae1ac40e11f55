//! Outlet geometry and flow relations
//!
//! A source is described either by its exit velocity W0 or by its volumetric
//! flow V1; the outlet area links the two. Rectangular outlets are replaced
//! by a circle of equivalent diameter, after which both W0 and V1 are
//! recomputed so they stay consistent with that circle.
//!
//! # References
//! - OND-86, "Methodology for calculating concentrations in atmospheric air
//!   of harmful substances contained in enterprise emissions", section 2
//!   (single source with circular outlet) and section 7 (rectangular outlet).

use super::rounding::{round3, METHODOLOGY_PI};

/// Volumetric flow from exit velocity and diameter (m³/s)
///
/// # Formula
/// ```text
/// V1 = 0.785 × W0 × D²
/// ```
pub fn flow_from_velocity(w0: f64, d: f64) -> f64 {
    round3(0.785 * w0 * d.powi(2))
}

/// Exit velocity from volumetric flow and diameter (m/s)
///
/// # Formula
/// ```text
/// W0 = 4 × V1 / (π × D²)
/// ```
///
/// # Returns
/// `None` when `d` is zero; the caller substitutes a zero velocity
pub fn velocity_from_flow(v1: f64, d: f64) -> Option<f64> {
    let area = METHODOLOGY_PI * d.powi(2);
    if area == 0.0 {
        return None;
    }
    Some(round3(4.0 * v1 / area))
}

/// Equivalent diameter of a rectangular outlet L × b (m)
///
/// # Formula
/// ```text
/// Dэ = 2 × L × b / (L + b)
/// ```
pub fn equivalent_diameter(l: f64, b: f64) -> f64 {
    round3(2.0 * l * b / (l + b))
}

/// Exit velocity through a rectangular outlet (m/s)
///
/// # Formula
/// ```text
/// W0 = V1 / (L × b)
/// ```
pub fn rectangular_velocity(v1: f64, l: f64, b: f64) -> f64 {
    round3(v1 / (l * b))
}

/// Equivalent volumetric flow through the circle of diameter Dэ (m³/s)
///
/// The result generally differs from the original V1.
///
/// # Formula
/// ```text
/// V1э = π × Dэ² / 4 × W0
/// ```
pub fn equivalent_flow(d_eq: f64, w0: f64) -> f64 {
    round3(METHODOLOGY_PI * d_eq.powi(2) / 4.0 * w0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_from_velocity() {
        // 0.785 × 5 × 0.0625 = 0.2453125
        assert_eq!(flow_from_velocity(5.0, 0.25), 0.245);
        assert_eq!(flow_from_velocity(0.0, 0.25), 0.0);
    }

    #[test]
    fn test_velocity_from_flow() {
        // 4 × 0.98 / (3.14 × 0.0625) = 19.9745
        assert_eq!(velocity_from_flow(0.98, 0.25), Some(19.975));
    }

    #[test]
    fn test_zero_diameter_has_no_velocity() {
        assert_eq!(velocity_from_flow(0.98, 0.0), None);
    }

    #[test]
    fn test_rectangular_outlet() {
        let d = equivalent_diameter(0.875, 0.35);
        assert_eq!(d, 0.5);

        let w0 = rectangular_velocity(0.98, 0.875, 0.35);
        assert_eq!(w0, 3.2);

        // 3.14 × 0.25 / 4 × 3.2 = 0.628, not the original 0.98
        assert_eq!(equivalent_flow(d, w0), 0.628);
    }

    #[test]
    fn test_square_outlet_equivalent_diameter_is_side() {
        assert_eq!(equivalent_diameter(0.6, 0.6), 0.6);
    }
}
