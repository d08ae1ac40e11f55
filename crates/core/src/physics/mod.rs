//! OND-86 formulas, one module per group
//!
//! Each function evaluates one formula of the methodology and returns the
//! value rounded the way the methodology rounds it. Piecewise formulas return
//! the selected regime together with the value. The functions are pure; the
//! [`DispersionCalculator`](crate::DispersionCalculator) sequences them and
//! records the derivation.

pub mod ground_level;
pub mod outlet;
pub mod plume;
pub mod rounding;

pub use ground_level::{
    buoyant_distance_coefficient, cold_dilution_factor, cold_max_concentration,
    cold_permissible_emission, hot_max_concentration, hot_permissible_emission,
    jet_distance_coefficient, max_concentration_distance, DistanceRegime,
};
pub use outlet::{
    equivalent_diameter, equivalent_flow, flow_from_velocity, rectangular_velocity,
    velocity_from_flow,
};
pub use plume::{
    buoyancy_parameter, exit_buoyancy_parameter, exit_velocity_parameter,
    hot_velocity_parameter, momentum_coefficient, momentum_regime, wind_coefficient,
    wind_regime, MomentumRegime, WindRegime,
};
pub use rounding::{round3, METHODOLOGY_PI};
