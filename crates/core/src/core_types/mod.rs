//! Core types: input parameters, units, memo slots and the derivation trace

pub mod params;
pub mod set_once;
pub mod trace;
pub mod units;

pub use params::*;
pub use set_once::SetOnce;
pub use trace::{DerivationStep, DerivationTrace, Operand, StepKind};
pub use units::*;
