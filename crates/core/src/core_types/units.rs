//! Semantic unit types for stack source inputs
//!
//! Newtype wrappers keep temperatures, lengths and flows from being mixed up
//! when a source is described. The formulas themselves work on plain `f64`
//! values taken out of these wrappers.
//!
//! # Design Philosophy
//! - Every quantity is `f64`: results are rounded to 3 decimals and the
//!   rounding has to happen on the same binary value every time
//! - Constructors do not validate; [`SourceParams`](super::SourceParams)
//!   validates the whole source at once and reports a typed error
//! - Serde support, serialized as the bare number
//!
//! # Usage
//! ```
//! use ond_dispersion_core::core_types::units::{Celsius, Meters};
//!
//! let gas = Celsius::new(100.0);
//! let air = Celsius::new(26.0);
//! assert_eq!(*(gas - air), 74.0);
//! assert_eq!(Meters::new(30.0).value(), 30.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Deref, Sub};

// ============================================================================
// TEMPERATURE TYPES
// ============================================================================

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Celsius(f64);

impl Deref for Celsius {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Celsius {
    /// Create a new Celsius temperature
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Celsius(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

// Celsius - Celsius = CelsiusDelta (difference between two absolute temperatures)
impl Sub for Celsius {
    type Output = CelsiusDelta;
    fn sub(self, rhs: Celsius) -> CelsiusDelta {
        CelsiusDelta(self.0 - rhs.0)
    }
}

/// Temperature difference in Celsius
/// Can be any value (positive or negative)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct CelsiusDelta(f64);

impl Deref for CelsiusDelta {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl CelsiusDelta {
    /// Create a temperature delta (can be any value, positive or negative)
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        CelsiusDelta(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Clamp negative differences to zero (an exhaust cooler than the air is
    /// treated as having no excess heat)
    #[inline]
    #[must_use]
    pub fn non_negative(self) -> Self {
        CelsiusDelta(self.0.max(0.0))
    }
}

// ============================================================================
// GEOMETRY AND FLOW TYPES
// ============================================================================

/// Length in meters (outlet diameter, side lengths, stack height)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Meters(f64);

impl Deref for Meters {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Meters {
    /// Create a new length in meters
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Meters(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Gas-air mixture exit velocity in m/s
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MetersPerSecond(f64);

impl Deref for MetersPerSecond {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl MetersPerSecond {
    /// Create a new velocity in m/s
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        MetersPerSecond(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Volumetric flow of the gas-air mixture in m³/s
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct CubicMetersPerSecond(f64);

impl Deref for CubicMetersPerSecond {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl CubicMetersPerSecond {
    /// Create a new volumetric flow in m³/s
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        CubicMetersPerSecond(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}
