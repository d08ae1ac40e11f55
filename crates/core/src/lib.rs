//! OND-86 Single-Source Dispersion Library
//!
//! Computes the maximum ground-level concentration of a pollutant emitted by a
//! single stack, the distance at which it occurs and the maximum permissible
//! emission, following the Soviet/Russian OND-86 methodology.
//!
//! ## Organisation
//!
//! - [`physics`]: the methodology formulas as pure functions, grouped by
//!   outlet relations, plume parameters and ground-level results
//! - [`calculator`]: [`DispersionCalculator`], which sequences the formulas
//!   through an explicit stage machine and records a derivation trace
//! - [`core_types`]: caller inputs, unit newtypes, write-once slots and the
//!   trace records
//! - [`error`]: the shared [`DispersionError`]
//!
//! ## Quick start
//!
//! ```
//! use ond_dispersion_core::{DispersionCalculator, EmissionLimit, PollutantParams, SourceParams};
//!
//! let source = SourceParams::default()
//!     .with_exit_velocity(5.0)
//!     .with_temperatures(100.0, 26.0);
//! let mut calc = DispersionCalculator::new(source).unwrap();
//! let report = calc
//!     .run_all(
//!         Some(&PollutantParams::new(10.0, 1.0)),
//!         Some(&EmissionLimit::new(0.5, 0.0)),
//!     )
//!     .unwrap();
//!
//! assert!(report.max_concentration.is_some());
//! println!("{}", report.trace);
//! ```

pub mod calculator;
pub mod core_types;
pub mod error;
pub mod physics;

pub use calculator::{Coefficients, DispersionCalculator, DispersionReport, Stage};
pub use core_types::{
    DerivationStep, DerivationTrace, EmissionLimit, PollutantParams, RegionalFactors,
    SourceParams, StepKind,
};
pub use error::{DispersionError, Result};
