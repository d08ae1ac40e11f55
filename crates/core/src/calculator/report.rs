//! Snapshot of a finished calculation

use super::stage::Stage;
use crate::core_types::DerivationTrace;
use crate::physics::{DistanceRegime, MomentumRegime, WindRegime};
use serde::Serialize;
use std::fmt;

/// Derived coefficients. Each is `None` until the stage that computes it ran,
/// and the hot-only ones (f, Vm, fe, m) stay `None` for cold sources.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coefficients {
    /// Buoyancy parameter f
    pub f: Option<f64>,
    /// Velocity parameter Vm
    pub vm: Option<f64>,
    /// Velocity parameter Vm'
    pub vm_prime: Option<f64>,
    /// Parameter fe
    pub fe: Option<f64>,
    /// Momentum coefficient m
    pub m: Option<f64>,
    /// Regime m was taken from
    pub momentum_regime: Option<MomentumRegime>,
    /// Wind coefficient n
    pub n: Option<f64>,
    /// Regime n was taken from
    pub wind_regime: Option<WindRegime>,
    /// Dilution factor K (cold sources)
    pub k: Option<f64>,
    /// Distance coefficient d, unrounded
    pub d: Option<f64>,
    /// Velocity band d was taken from
    pub distance_regime: Option<DistanceRegime>,
}

/// Everything a front end needs to show the result of one calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispersionReport {
    /// Cold-source formulas were used
    pub cold: bool,
    /// The outlet was rectangular (D is the equivalent diameter)
    pub rectangular: bool,
    /// D (m)
    pub diameter: f64,
    /// H (m)
    pub height: f64,
    /// ΔT (°C)
    pub temperature_excess: f64,
    /// W0 (m/s)
    pub exit_velocity: f64,
    /// V1 (m³/s)
    pub flow_rate: f64,
    /// f, Vm, Vm', fe, m, n, K, d
    pub coefficients: Coefficients,
    /// A as used
    pub stratification: Option<f64>,
    /// F as used
    pub settling: Option<f64>,
    /// η as used
    pub terrain: Option<f64>,
    /// Cm (mg/m³)
    pub max_concentration: Option<f64>,
    /// Xm (m)
    pub max_distance: Option<f64>,
    /// ПДВ (g/s)
    pub permissible_emission: Option<f64>,
    /// Last completed stage
    pub stage: Stage,
    /// Full derivation
    pub trace: DerivationTrace,
}

impl fmt::Display for DispersionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = if self.cold { "cold" } else { "hot" };
        let outlet = if self.rectangular {
            "rectangular"
        } else {
            "circular"
        };
        writeln!(f, "Source: {class}, {outlet} outlet")?;
        writeln!(
            f,
            "D = {} m, H = {} m, ΔT = {} °C, W0 = {} m/s, V1 = {} m³/s",
            self.diameter, self.height, self.temperature_excess, self.exit_velocity, self.flow_rate
        )?;

        let rows = [
            ("f", self.coefficients.f, ""),
            ("Vm", self.coefficients.vm, " m/s"),
            ("Vm'", self.coefficients.vm_prime, " m/s"),
            ("fe", self.coefficients.fe, ""),
            ("m", self.coefficients.m, ""),
            ("n", self.coefficients.n, ""),
            ("Cm", self.max_concentration, " mg/m³"),
            ("Xm", self.max_distance, " m"),
            ("ПДВ", self.permissible_emission, " g/s"),
        ];
        for (symbol, value, unit) in rows {
            if let Some(value) = value {
                writeln!(f, "{symbol} = {value}{unit}")?;
            }
        }
        Ok(())
    }
}
