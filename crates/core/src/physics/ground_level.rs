//! Ground-level concentration, its distance, and the permissible emission
//!
//! Given the coefficients m and n, the maximum ground-level concentration Cm
//! follows from the regional coefficients A, F, η and the source geometry.
//! Inverting the same expression for a target concentration (the permissible
//! concentration less the background) gives the maximum permissible emission.
//! The distance Xm at which Cm occurs uses a separate piecewise coefficient d.
//!
//! Cold sources use the simplified variants with H^(4/3) in place of
//! H² · ∛(V1 · ΔT).
//!
//! # References
//! - OND-86, section 2, formulas (2.1), (2.13)-(2.16) and section 5 (ПДВ)

use super::rounding::round3;
use crate::core_types::RegionalFactors;
use crate::error::{DispersionError, Result};
use serde::Serialize;
use std::fmt;

/// Dilution helper K of a cold source
///
/// # Formula
/// ```text
/// K = D / (8 × V1)
/// ```
pub fn cold_dilution_factor(d: f64, v1: f64) -> f64 {
    round3(d / (8.0 * v1))
}

/// Maximum ground-level concentration of a cold source (mg/m³)
///
/// # Formula
/// ```text
/// Cm = A × M × F × n × η / H^(4/3) × K
/// ```
pub fn cold_max_concentration(
    factors: &RegionalFactors,
    mass_rate: f64,
    n: f64,
    h: f64,
    k: f64,
) -> f64 {
    let numerator =
        factors.stratification * mass_rate * factors.settling * n * factors.terrain;
    round3(numerator / h.powf(4.0 / 3.0) * k)
}

/// Maximum ground-level concentration of a hot source (mg/m³)
///
/// # Formula
/// ```text
/// Cm = A × M × F × m × n × η / (H² × ∛(V1 × ΔT))
/// ```
pub fn hot_max_concentration(
    factors: &RegionalFactors,
    mass_rate: f64,
    m: f64,
    n: f64,
    h: f64,
    v1: f64,
    dt: f64,
) -> f64 {
    let numerator =
        factors.stratification * mass_rate * factors.settling * m * n * factors.terrain;
    round3(numerator / (h.powi(2) * (v1 * dt).cbrt()))
}

/// Velocity band of the distance coefficient d
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DistanceRegime {
    /// V ≤ 0.5
    Low,
    /// 0.5 < V ≤ 2
    Intermediate,
    /// V > 2
    High,
}

impl DistanceRegime {
    /// Select the band for velocity parameter `v`.
    ///
    /// # Errors
    /// [`DispersionError::OutOfDomain`] for a negative or NaN velocity.
    pub fn classify(quantity: &'static str, v: f64) -> Result<Self> {
        if v.is_nan() || v < 0.0 {
            Err(DispersionError::out_of_domain(quantity, v))
        } else if v <= 0.5 {
            Ok(DistanceRegime::Low)
        } else if v <= 2.0 {
            Ok(DistanceRegime::Intermediate)
        } else {
            Ok(DistanceRegime::High)
        }
    }

    /// Condition text for the given velocity symbol
    pub fn condition(self, symbol: &str) -> String {
        match self {
            DistanceRegime::Low => format!("{symbol} ≤ 0.5"),
            DistanceRegime::Intermediate => format!("0.5 < {symbol} ≤ 2"),
            DistanceRegime::High => format!("{symbol} > 2"),
        }
    }
}

impl fmt::Display for DistanceRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.condition("V"))
    }
}

/// Distance coefficient d for cold sources and sources with f > 100.
/// Not rounded.
///
/// # Formula
/// ```text
/// Vm' ≤ 0.5:      d = 5.7
/// 0.5 < Vm' ≤ 2:  d = 11.4 × Vm'
/// Vm' > 2:        d = 16 × √Vm'
/// ```
///
/// # Errors
/// See [`DistanceRegime::classify`].
pub fn jet_distance_coefficient(vm_prime: f64) -> Result<(DistanceRegime, f64)> {
    let regime = DistanceRegime::classify("Vm'", vm_prime)?;
    let d = match regime {
        DistanceRegime::Low => 5.7,
        DistanceRegime::Intermediate => 11.4 * vm_prime,
        DistanceRegime::High => 16.0 * vm_prime.sqrt(),
    };
    Ok((regime, d))
}

/// Distance coefficient d for hot sources with f ≤ 100. Not rounded.
///
/// # Formula
/// ```text
/// Vm ≤ 0.5:      d = 2.48 × (1 + 0.28 × ∛fe)
/// 0.5 < Vm ≤ 2:  d = 4.95 × Vm × (1 + 0.28 × ∛f)
/// Vm > 2:        d = 7 × √Vm × (1 + 0.28 × ∛f)
/// ```
///
/// # Errors
/// See [`DistanceRegime::classify`].
pub fn buoyant_distance_coefficient(vm: f64, f: f64, fe: f64) -> Result<(DistanceRegime, f64)> {
    let regime = DistanceRegime::classify("Vm", vm)?;
    let d = match regime {
        DistanceRegime::Low => 2.48 * (1.0 + 0.28 * fe.cbrt()),
        DistanceRegime::Intermediate => 4.95 * vm * (1.0 + 0.28 * f.cbrt()),
        DistanceRegime::High => 7.0 * vm.sqrt() * (1.0 + 0.28 * f.cbrt()),
    };
    Ok((regime, d))
}

/// Distance Xm from the source at which Cm is reached (m)
///
/// # Formula
/// ```text
/// Xm = (5 − F) / 4 × H × d
/// ```
pub fn max_concentration_distance(settling: f64, h: f64, d: f64) -> f64 {
    round3((5.0 - settling) / 4.0 * h * d)
}

/// Maximum permissible emission of a cold source (g/s)
///
/// # Formula
/// ```text
/// ПДВ = (ПДК − Cf) × H^(4/3) × 8 × V1 / (A × F × n × η × D)
/// ```
pub fn cold_permissible_emission(
    factors: &RegionalFactors,
    allowance: f64,
    n: f64,
    h: f64,
    v1: f64,
    d: f64,
) -> f64 {
    let denominator =
        factors.stratification * factors.settling * n * factors.terrain * d;
    round3(allowance * h.powf(4.0 / 3.0) * 8.0 * v1 / denominator)
}

/// Maximum permissible emission of a hot source (g/s)
///
/// # Formula
/// ```text
/// ПДВ = (ПДК − Cf) × H² × ∛(V1 × ΔT) / (A × F × m × n × η)
/// ```
pub fn hot_permissible_emission(
    factors: &RegionalFactors,
    allowance: f64,
    m: f64,
    n: f64,
    h: f64,
    v1: f64,
    dt: f64,
) -> f64 {
    let denominator = factors.stratification * factors.settling * m * n * factors.terrain;
    round3(allowance * h.powi(2) * (v1 * dt).cbrt() / denominator)
}
