//! Caller-supplied inputs for a dispersion calculation
//!
//! All structs deserialize from a named-field mapping, so a front end can hand
//! over exactly the fields its scenario asks for and let the defaults fill the
//! rest.

use super::units::{Celsius, CubicMetersPerSecond, Meters, MetersPerSecond};
use crate::error::{DispersionError, Result};
use serde::{Deserialize, Serialize};

/// Default outlet diameter D (m)
pub const DEFAULT_DIAMETER: f64 = 0.25;
/// Default stack height H (m)
pub const DEFAULT_HEIGHT: f64 = 30.0;
/// Default exhaust temperature Tg (°C)
pub const DEFAULT_GAS_TEMPERATURE: f64 = 100.0;
/// Default ambient air temperature Tv (°C)
pub const DEFAULT_AIR_TEMPERATURE: f64 = 26.0;
/// Default temperature stratification coefficient A
pub const DEFAULT_STRATIFICATION: f64 = 160.0;
/// Default terrain coefficient η
pub const DEFAULT_TERRAIN: f64 = 1.0;
/// Default settling coefficient F used by the permissible-emission stage
pub const DEFAULT_SETTLING: f64 = 1.0;

/// Geometry, temperatures and flow of a single emission source.
///
/// Exactly one of `exit_velocity` (W0) and `flow_rate` (V1) is expected; the
/// other is derived. Giving both `length` and `width` switches the outlet to
/// rectangular, in which case an equivalent diameter replaces `diameter`. A
/// rectangular outlet is driven by V1 only: its W0 is `V1 / (L · b)`.
///
/// # Example
/// ```
/// use ond_dispersion_core::SourceParams;
///
/// let params = SourceParams::default()
///     .with_flow_rate(0.98)
///     .with_height(25.0)
///     .with_rectangular_outlet(0.875, 0.35)
///     .with_temperatures(25.0, 25.0);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceParams {
    /// W0: mean exit velocity of the gas-air mixture
    pub exit_velocity: Option<MetersPerSecond>,
    /// D: outlet diameter
    pub diameter: Meters,
    /// H: height of the outlet above ground
    pub height: Meters,
    /// Tg: exhaust temperature
    pub gas_temperature: Celsius,
    /// Tv: ambient air temperature
    pub air_temperature: Celsius,
    /// V1: volumetric flow of the gas-air mixture
    pub flow_rate: Option<CubicMetersPerSecond>,
    /// Treat the source as cold regardless of the temperature difference
    pub force_cold: bool,
    /// L: rectangular outlet length
    pub length: Option<Meters>,
    /// b: rectangular outlet width
    pub width: Option<Meters>,
}

impl Default for SourceParams {
    fn default() -> Self {
        Self {
            exit_velocity: None,
            diameter: Meters::new(DEFAULT_DIAMETER),
            height: Meters::new(DEFAULT_HEIGHT),
            gas_temperature: Celsius::new(DEFAULT_GAS_TEMPERATURE),
            air_temperature: Celsius::new(DEFAULT_AIR_TEMPERATURE),
            flow_rate: None,
            force_cold: false,
            length: None,
            width: None,
        }
    }
}

impl SourceParams {
    /// Supply the exit velocity W0 (m/s)
    pub fn with_exit_velocity(mut self, w0: f64) -> Self {
        self.exit_velocity = Some(MetersPerSecond::new(w0));
        self
    }

    /// Supply the volumetric flow V1 (m³/s)
    pub fn with_flow_rate(mut self, v1: f64) -> Self {
        self.flow_rate = Some(CubicMetersPerSecond::new(v1));
        self
    }

    /// Set the outlet diameter D (m)
    pub fn with_diameter(mut self, d: f64) -> Self {
        self.diameter = Meters::new(d);
        self
    }

    /// Set the stack height H (m)
    pub fn with_height(mut self, h: f64) -> Self {
        self.height = Meters::new(h);
        self
    }

    /// Set exhaust (Tg) and ambient (Tv) temperatures (°C)
    pub fn with_temperatures(mut self, gas: f64, air: f64) -> Self {
        self.gas_temperature = Celsius::new(gas);
        self.air_temperature = Celsius::new(air);
        self
    }

    /// Rectangular outlet of length L and width b (m)
    pub fn with_rectangular_outlet(mut self, length: f64, width: f64) -> Self {
        self.length = Some(Meters::new(length));
        self.width = Some(Meters::new(width));
        self
    }

    /// Force the cold-source formulas
    pub fn cold(mut self) -> Self {
        self.force_cold = true;
        self
    }

    /// Both side lengths of a rectangular outlet, when given
    pub fn rectangular_sides(&self) -> Option<(f64, f64)> {
        match (self.length, self.width) {
            (Some(l), Some(b)) => Some((l.value(), b.value())),
            _ => None,
        }
    }

    /// Check the source for values the methodology cannot work with.
    ///
    /// A zero diameter is accepted: deriving W0 from it falls back to zero.
    ///
    /// # Errors
    /// Returns [`DispersionError::InvalidInput`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<()> {
        non_negative("D", *self.diameter)?;
        positive("H", *self.height)?;
        finite("Tg", *self.gas_temperature)?;
        finite("Tv", *self.air_temperature)?;

        match (self.exit_velocity, self.flow_rate) {
            (None, None) => {
                return Err(DispersionError::invalid_input(
                    "W0",
                    "either exit velocity W0 or volumetric flow V1 must be supplied",
                ));
            }
            (Some(_), Some(_)) => {
                return Err(DispersionError::invalid_input(
                    "W0",
                    "supply only one of exit velocity W0 and volumetric flow V1",
                ));
            }
            (Some(w0), None) => non_negative("W0", *w0)?,
            (None, Some(v1)) => non_negative("V1", *v1)?,
        }

        match (self.length, self.width) {
            (Some(l), Some(b)) => {
                positive("L", *l)?;
                positive("b", *b)?;
            }
            (Some(_), None) => {
                return Err(DispersionError::invalid_input(
                    "b",
                    "a rectangular outlet needs both L and b",
                ));
            }
            (None, Some(_)) => {
                return Err(DispersionError::invalid_input(
                    "L",
                    "a rectangular outlet needs both L and b",
                ));
            }
            (None, None) => {}
        }

        if self.exit_velocity.is_some() && self.rectangular_sides().is_some() {
            return Err(DispersionError::invalid_input(
                "W0",
                "a rectangular outlet takes volumetric flow V1; W0 follows from V1 / (L · b)",
            ));
        }
        Ok(())
    }
}

/// Regional coefficients shared by the concentration and emission stages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionalFactors {
    /// A: temperature stratification coefficient of the region
    pub stratification: f64,
    /// F: dimensionless settling (shape) coefficient of the pollutant
    pub settling: f64,
    /// η: terrain coefficient
    pub terrain: f64,
}

impl Default for RegionalFactors {
    fn default() -> Self {
        Self {
            stratification: DEFAULT_STRATIFICATION,
            settling: DEFAULT_SETTLING,
            terrain: DEFAULT_TERRAIN,
        }
    }
}

impl RegionalFactors {
    /// Factors with the given F and default A, η
    pub fn with_settling(settling: f64) -> Self {
        Self {
            settling,
            ..Self::default()
        }
    }

    /// # Errors
    /// Returns [`DispersionError::InvalidInput`] for non-finite values.
    pub fn validate(&self) -> Result<()> {
        finite("A", self.stratification)?;
        finite("F", self.settling)?;
        finite("η", self.terrain)
    }
}

/// Inputs of the maximum-concentration stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollutantParams {
    /// M: pollutant mass emission rate (g/s)
    pub mass_rate: f64,
    /// A, F, η
    #[serde(flatten)]
    pub factors: RegionalFactors,
}

impl PollutantParams {
    /// Pollutant with mass rate M and settling coefficient F; A and η default
    pub fn new(mass_rate: f64, settling: f64) -> Self {
        Self {
            mass_rate,
            factors: RegionalFactors::with_settling(settling),
        }
    }

    /// Override A
    pub fn with_stratification(mut self, a: f64) -> Self {
        self.factors.stratification = a;
        self
    }

    /// Override η
    pub fn with_terrain(mut self, nu: f64) -> Self {
        self.factors.terrain = nu;
        self
    }

    /// # Errors
    /// Returns [`DispersionError::InvalidInput`] for non-finite values.
    pub fn validate(&self) -> Result<()> {
        finite("M", self.mass_rate)?;
        self.factors.validate()
    }
}

/// Inputs of the maximum-permissible-emission stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionLimit {
    /// ПДК: maximum permissible concentration (mg/m³)
    pub threshold: f64,
    /// Cf: background concentration (mg/m³)
    pub background: f64,
    /// A, F, η
    #[serde(flatten)]
    pub factors: RegionalFactors,
}

impl EmissionLimit {
    /// Limit with default A, F, η
    pub fn new(threshold: f64, background: f64) -> Self {
        Self {
            threshold,
            background,
            factors: RegionalFactors::default(),
        }
    }

    /// Override the regional coefficients
    pub fn with_factors(mut self, factors: RegionalFactors) -> Self {
        self.factors = factors;
        self
    }

    /// # Errors
    /// Returns [`DispersionError::InvalidInput`] for non-finite values.
    pub fn validate(&self) -> Result<()> {
        finite("pdk", self.threshold)?;
        finite("Cf", self.background)?;
        self.factors.validate()
    }
}

fn finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DispersionError::invalid_input(
            field,
            format!("must be a finite number, got {value}"),
        ))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(DispersionError::invalid_input(
            field,
            format!("must not be negative, got {value}"),
        ));
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(DispersionError::invalid_input(
            field,
            format!("must be positive, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_methodology() {
        let params = SourceParams::default();
        assert_eq!(params.diameter.value(), 0.25);
        assert_eq!(params.height.value(), 30.0);
        assert_eq!(params.gas_temperature.value(), 100.0);
        assert_eq!(params.air_temperature.value(), 26.0);
        assert!(!params.force_cold);

        let factors = RegionalFactors::default();
        assert_eq!(factors.stratification, 160.0);
        assert_eq!(factors.terrain, 1.0);
        assert_eq!(factors.settling, 1.0);
    }

    #[test]
    fn test_flow_must_be_supplied_exactly_once() {
        let err = SourceParams::default().validate().unwrap_err();
        assert!(matches!(err, DispersionError::InvalidInput { field: "W0", .. }));

        let both = SourceParams::default().with_exit_velocity(5.0).with_flow_rate(0.2);
        assert!(both.validate().is_err());

        assert!(SourceParams::default().with_exit_velocity(5.0).validate().is_ok());
    }

    #[test]
    fn test_height_must_be_positive() {
        let err = SourceParams::default()
            .with_exit_velocity(5.0)
            .with_height(0.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, DispersionError::InvalidInput { field: "H", .. }));
    }

    #[test]
    fn test_zero_diameter_is_accepted() {
        let params = SourceParams::default().with_flow_rate(1.0).with_diameter(0.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_rectangular_outlet_needs_both_sides() {
        let mut params = SourceParams::default().with_flow_rate(1.0);
        params.length = Some(Meters::new(0.8));
        assert!(matches!(
            params.validate(),
            Err(DispersionError::InvalidInput { field: "b", .. })
        ));
        assert_eq!(params.rectangular_sides(), None);

        let params = params.with_rectangular_outlet(0.8, 0.4);
        assert_eq!(params.rectangular_sides(), Some((0.8, 0.4)));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_rectangular_outlet_rejects_exit_velocity() {
        let params = SourceParams::default()
            .with_exit_velocity(5.0)
            .with_rectangular_outlet(1.0, 0.5);
        let err = params.validate().unwrap_err();
        assert!(matches!(err, DispersionError::InvalidInput { field: "W0", .. }));
        assert!(err.to_string().contains("V1 / (L · b)"));

        // The same outlet driven by V1 is fine, and W0 alone stays circular
        let by_flow = SourceParams::default()
            .with_flow_rate(2.5)
            .with_rectangular_outlet(1.0, 0.5);
        assert!(by_flow.validate().is_ok());
        assert!(SourceParams::default()
            .with_exit_velocity(5.0)
            .with_diameter(0.8)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_non_finite_inputs_rejected() {
        let params = SourceParams::default().with_exit_velocity(f64::NAN);
        assert!(params.validate().is_err());

        let pollutant = PollutantParams::new(f64::INFINITY, 1.0);
        assert!(matches!(
            pollutant.validate(),
            Err(DispersionError::InvalidInput { field: "M", .. })
        ));
    }

    #[test]
    fn test_deserialize_named_fields_with_defaults() {
        let params: SourceParams =
            serde_json::from_str(r#"{"flow_rate": 0.98, "height": 25.0}"#).unwrap();
        assert_eq!(params.flow_rate, Some(CubicMetersPerSecond::new(0.98)));
        assert_eq!(params.height.value(), 25.0);
        assert_eq!(params.diameter.value(), 0.25);

        let pollutant: PollutantParams =
            serde_json::from_str(r#"{"mass_rate": 16.0, "settling": 2.0}"#).unwrap();
        assert_eq!(pollutant.factors.stratification, 160.0);
        assert_eq!(pollutant.factors.settling, 2.0);
    }
}
