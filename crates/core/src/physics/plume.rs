//! Plume-rise parameters and the dimensionless coefficients m and n
//!
//! The exit conditions of a source are condensed into four parameters:
//! the buoyancy parameter f, the velocity parameters Vm (hot sources) and
//! Vm' (all sources), and fe. Piecewise empirical functions of these give the
//! momentum coefficient m and the wind coefficient n used by the
//! concentration formulas.
//!
//! # References
//! - OND-86, section 2, formulas (2.3)-(2.7) and (2.8a)-(2.8c)
//! - Berlyand, M.E. (1975). "Modern problems of atmospheric diffusion and
//!   air pollution." Gidrometeoizdat.

use super::rounding::round3;
use crate::error::{DispersionError, Result};
use serde::Serialize;
use std::fmt;

/// Buoyancy parameter f
///
/// # Formula
/// ```text
/// f = 1000 × W0² × D / (H² × ΔT)
/// ```
pub fn buoyancy_parameter(w0: f64, d: f64, h: f64, dt: f64) -> f64 {
    round3(1000.0 * w0.powi(2) * d / (h.powi(2) * dt))
}

/// Velocity parameter Vm of a hot source
///
/// # Formula
/// ```text
/// Vm = 0.65 × ∛(V1 × ΔT / H)
/// ```
pub fn hot_velocity_parameter(v1: f64, dt: f64, h: f64) -> f64 {
    round3(0.65 * (v1 * dt / h).cbrt())
}

/// Velocity parameter Vm'
///
/// # Formula
/// ```text
/// Vm' = 1.3 × W0 × D / H
/// ```
pub fn exit_velocity_parameter(w0: f64, d: f64, h: f64) -> f64 {
    round3(1.3 * w0 * d / h)
}

/// Exit buoyancy parameter fe
///
/// # Formula
/// ```text
/// fe = 800 × (Vm')³
/// ```
pub fn exit_buoyancy_parameter(vm_prime: f64) -> f64 {
    round3(800.0 * vm_prime.powi(3))
}

/// Regime of the momentum coefficient m
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MomentumRegime {
    /// fe < f < 100: m is taken at fe
    ExitLimited,
    /// f < 100 (and f ≤ fe)
    Buoyant,
    /// f ≥ 100
    Jet,
}

impl MomentumRegime {
    /// Condition text as printed in the methodology
    pub fn condition(self) -> &'static str {
        match self {
            MomentumRegime::ExitLimited => "fe < f < 100",
            MomentumRegime::Buoyant => "f < 100",
            MomentumRegime::Jet => "f ≥ 100",
        }
    }
}

impl fmt::Display for MomentumRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.condition())
    }
}

/// Select the regime of m. Conditions are tested in order, first match wins.
///
/// # Errors
/// [`DispersionError::OutOfDomain`] when `f` or `fe` is NaN.
pub fn momentum_regime(f: f64, fe: f64) -> Result<MomentumRegime> {
    if f.is_nan() {
        return Err(DispersionError::out_of_domain("f", f));
    }
    if fe.is_nan() {
        return Err(DispersionError::out_of_domain("fe", fe));
    }

    if fe < f && f < 100.0 {
        Ok(MomentumRegime::ExitLimited)
    } else if f < 100.0 {
        Ok(MomentumRegime::Buoyant)
    } else {
        Ok(MomentumRegime::Jet)
    }
}

/// Momentum coefficient m
///
/// # Formula
/// ```text
/// fe < f < 100:  m = 1 / (0.67 + 0.1 × √fe + 0.34 × ∛fe)
/// f < 100:       m = 1 / (0.67 + 0.1 × √f + 0.34 × ∛f)
/// f ≥ 100:       m = 1.47 / ∛f
/// ```
///
/// # Errors
/// See [`momentum_regime`].
pub fn momentum_coefficient(f: f64, fe: f64) -> Result<(MomentumRegime, f64)> {
    let regime = momentum_regime(f, fe)?;
    let m = match regime {
        MomentumRegime::ExitLimited => subcritical_momentum(fe),
        MomentumRegime::Buoyant => subcritical_momentum(f),
        MomentumRegime::Jet => round3(1.47 / f.cbrt()),
    };
    Ok((regime, m))
}

fn subcritical_momentum(x: f64) -> f64 {
    round3(1.0 / (0.67 + 0.1 * x.sqrt() + 0.34 * x.cbrt()))
}

/// Regime of the wind coefficient n
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WindRegime {
    /// V ≥ 2
    Fast,
    /// 0.5 ≤ V < 2
    Moderate,
    /// V < 0.5
    Slow,
}

impl WindRegime {
    /// Condition text as printed in the methodology
    pub fn condition(self) -> &'static str {
        match self {
            WindRegime::Fast => "V ≥ 2",
            WindRegime::Moderate => "0.5 ≤ V < 2",
            WindRegime::Slow => "V < 0.5",
        }
    }
}

impl fmt::Display for WindRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.condition())
    }
}

/// Select the regime of n for reference velocity `v` (Vm, or Vm' for cold
/// sources).
///
/// # Errors
/// [`DispersionError::OutOfDomain`] for a negative or NaN velocity.
pub fn wind_regime(v: f64) -> Result<WindRegime> {
    if v >= 2.0 {
        Ok(WindRegime::Fast)
    } else if (0.5..2.0).contains(&v) {
        Ok(WindRegime::Moderate)
    } else if (0.0..0.5).contains(&v) {
        Ok(WindRegime::Slow)
    } else {
        Err(DispersionError::out_of_domain("V", v))
    }
}

/// Wind coefficient n
///
/// # Formula
/// ```text
/// V ≥ 2:        n = 1
/// 0.5 ≤ V < 2:  n = 0.532 × V² − 2.13 × V + 3.13
/// V < 0.5:      n = 4.4 × V
/// ```
///
/// # Errors
/// See [`wind_regime`].
pub fn wind_coefficient(v: f64) -> Result<(WindRegime, f64)> {
    let regime = wind_regime(v)?;
    let n = match regime {
        WindRegime::Fast => 1.0,
        WindRegime::Moderate => round3(0.532 * v.powi(2) - 2.13 * v + 3.13),
        WindRegime::Slow => round3(4.4 * v),
    };
    Ok((regime, n))
}
