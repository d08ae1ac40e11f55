//! Single-source dispersion calculator
//!
//! [`DispersionCalculator`] holds one emission source and is driven through
//! the OND-86 stages in order:
//!
//! 1. [`new`](DispersionCalculator::new): validate inputs, derive the missing
//!    one of W0/V1, replace a rectangular outlet by its equivalent circle
//! 2. [`parameters`](DispersionCalculator::parameters): f, Vm, Vm', fe
//! 3. [`m_coef`](DispersionCalculator::m_coef): momentum coefficient m (hot
//!    sources only)
//! 4. [`n_coef`](DispersionCalculator::n_coef): wind coefficient n
//! 5. [`max_concentrate`](DispersionCalculator::max_concentrate) then
//!    [`max_distance`](DispersionCalculator::max_distance): Cm and Xm
//! 6. [`pdv_func`](DispersionCalculator::pdv_func): maximum permissible
//!    emission, independent of step 5
//!
//! Every stage checks that its prerequisites completed and appends its
//! working to the [`DerivationTrace`]. Values are rounded to three decimals
//! as they are computed and later stages use the rounded values.
//!
//! # Example
//! ```
//! use ond_dispersion_core::{DispersionCalculator, PollutantParams, SourceParams};
//!
//! let source = SourceParams::default()
//!     .with_flow_rate(0.98)
//!     .with_height(25.0)
//!     .with_rectangular_outlet(0.875, 0.35)
//!     .with_temperatures(25.0, 25.0);
//!
//! let mut calc = DispersionCalculator::new(source).unwrap();
//! assert!(calc.is_cold());
//! assert_eq!(calc.diameter(), 0.5);
//!
//! calc.parameters().unwrap();
//! calc.n_coef().unwrap();
//! calc.max_concentrate(&PollutantParams::new(16.0, 1.0)).unwrap();
//! calc.max_distance().unwrap();
//! assert_eq!(calc.xm(), Some(142.5));
//! ```

pub mod report;
pub mod stage;

pub use report::{Coefficients, DispersionReport};
pub use stage::{CompletedStages, Stage};

use crate::core_types::{
    DerivationStep, DerivationTrace, EmissionLimit, PollutantParams, RegionalFactors, SetOnce,
    SourceParams,
};
use crate::error::{ensure_finite, DispersionError, Result};
use crate::physics::{self, DistanceRegime, MomentumRegime, WindRegime};
use tracing::{debug, info, warn};

/// Dispersion parameters of one stack, computed stage by stage
#[derive(Debug, Clone)]
pub struct DispersionCalculator {
    diameter: f64,
    height: f64,
    temperature_excess: f64,
    exit_velocity: f64,
    flow_rate: f64,
    cold: bool,
    rectangular: bool,

    coefficients: Coefficients,

    // A, F, η: fixed by whichever of max_concentrate / pdv_func succeeds first
    stratification: SetOnce<f64>,
    settling: SetOnce<f64>,
    terrain: SetOnce<f64>,

    mass_rate: Option<f64>,
    threshold: Option<f64>,
    background: Option<f64>,

    max_concentration: Option<f64>,
    max_distance: Option<f64>,
    permissible_emission: Option<f64>,

    completed: CompletedStages,
    current: Stage,
    trace: DerivationTrace,
}

impl DispersionCalculator {
    /// Accept a source and normalize it.
    ///
    /// Derives V1 from W0 (or W0 from V1) and, for a rectangular outlet,
    /// replaces D by the equivalent diameter and recomputes W0 and V1 from
    /// it. A temperature difference of zero or less makes the source cold.
    ///
    /// # Errors
    /// [`DispersionError::InvalidInput`] when `params` fails
    /// [`SourceParams::validate`].
    pub fn new(params: SourceParams) -> Result<Self> {
        params.validate()?;

        let mut calc = Self {
            diameter: params.diameter.value(),
            height: params.height.value(),
            temperature_excess: 0.0,
            exit_velocity: 0.0,
            flow_rate: 0.0,
            cold: params.force_cold,
            rectangular: false,
            coefficients: Coefficients::default(),
            stratification: SetOnce::new(),
            settling: SetOnce::new(),
            terrain: SetOnce::new(),
            mass_rate: None,
            threshold: None,
            background: None,
            max_concentration: None,
            max_distance: None,
            permissible_emission: None,
            completed: CompletedStages::empty(),
            current: Stage::Constructed,
            trace: DerivationTrace::new(),
        };
        calc.complete(Stage::Constructed);

        calc.normalize(&params)?;
        calc.complete(Stage::Normalized);

        info!(
            "Normalized {} source with {} outlet: D={} m, H={} m, ΔT={}, W0={} m/s, V1={} m³/s",
            calc.class_name(),
            if calc.rectangular { "rectangular" } else { "circular" },
            calc.diameter,
            calc.height,
            calc.temperature_excess,
            calc.exit_velocity,
            calc.flow_rate
        );
        Ok(calc)
    }

    fn normalize(&mut self, params: &SourceParams) -> Result<()> {
        let excess = (params.gas_temperature - params.air_temperature).non_negative();
        self.temperature_excess = excess.value();
        if self.temperature_excess == 0.0 {
            self.cold = true;
        }

        let d = self.diameter;
        match (params.exit_velocity, params.flow_rate) {
            (Some(w0), None) => {
                let w0 = w0.value();
                self.exit_velocity = w0;
                self.flow_rate = physics::flow_from_velocity(w0, d);
                if w0 != 0.0 {
                    self.trace.push(
                        DerivationStep::formula(
                            "Volumetric flow of the gas-air mixture",
                            "V1 = 0.785 · W0 · D²",
                        )
                        .operand("W0", w0)
                        .operand("D", d)
                        .result(self.flow_rate)
                        .unit("m³/s"),
                    );
                }
            }
            (None, Some(v1)) => {
                let v1 = v1.value();
                self.flow_rate = v1;
                if let Some(w0) = physics::velocity_from_flow(v1, d) {
                    self.exit_velocity = w0;
                    if !self.cold {
                        self.trace.push(
                            DerivationStep::formula(
                                "Exit velocity of the gas-air mixture",
                                "W0 = 4 · V1 / (π · D²)",
                            )
                            .operand("V1", v1)
                            .operand("D", d)
                            .result(w0)
                            .unit("m/s"),
                        );
                    }
                } else {
                    warn!("Outlet diameter is zero, exit velocity W0 taken as 0");
                    self.exit_velocity = 0.0;
                }
            }
            _ => {
                return Err(DispersionError::invalid_input(
                    "W0",
                    "exactly one of W0 and V1 must be supplied",
                ))
            }
        }

        if let Some((l, b)) = params.rectangular_sides() {
            self.rectangular = true;
            self.trace.push(DerivationStep::heading(format!(
                "Single source with a rectangular outlet ({})",
                self.class_name()
            )));

            self.diameter = physics::equivalent_diameter(l, b);
            self.trace.push(
                DerivationStep::formula("Equivalent diameter", "Dэ = 2 · L · b / (L + b)")
                    .operand("L", l)
                    .operand("b", b)
                    .result(self.diameter)
                    .unit("m"),
            );

            let v1 = self.flow_rate;
            self.exit_velocity = physics::rectangular_velocity(v1, l, b);
            self.trace.push(
                DerivationStep::formula("Exit velocity of the gas-air mixture", "W0 = V1 / (L · b)")
                    .operand("V1", v1)
                    .operand("L", l)
                    .operand("b", b)
                    .result(self.exit_velocity)
                    .unit("m/s"),
            );

            self.flow_rate = physics::equivalent_flow(self.diameter, self.exit_velocity);
            self.trace.push(
                DerivationStep::formula("Equivalent volumetric flow", "V1 = π · Dэ² / 4 · W0")
                    .operand("Dэ", self.diameter)
                    .operand("W0", self.exit_velocity)
                    .result(self.flow_rate)
                    .unit("m³/s"),
            );
            debug!(
                "Rectangular outlet {}x{} m replaced by D={} m, W0={} m/s, V1={} m³/s",
                l, b, self.diameter, self.exit_velocity, self.flow_rate
            );
        } else {
            self.trace.push(DerivationStep::heading(format!(
                "Single source with a circular outlet ({})",
                self.class_name()
            )));
        }
        Ok(())
    }

    /// Compute f, Vm and fe (hot sources) and Vm' (all sources).
    ///
    /// # Errors
    /// [`DispersionError::StageRepeated`] on a second call.
    pub fn parameters(&mut self) -> Result<()> {
        self.enter(Stage::ParametersComputed, &[Stage::Normalized])?;

        let (w0, d, h, dt, v1) = (
            self.exit_velocity,
            self.diameter,
            self.height,
            self.temperature_excess,
            self.flow_rate,
        );

        if !self.cold {
            let f = physics::buoyancy_parameter(w0, d, h, dt);
            self.trace.push(
                DerivationStep::formula("Buoyancy parameter f", "f = 1000 · W0² · D / (H² · ΔT)")
                    .operand("W0", w0)
                    .operand("D", d)
                    .operand("H", h)
                    .operand("ΔT", dt)
                    .result(f),
            );
            self.coefficients.f = Some(f);

            let vm = physics::hot_velocity_parameter(v1, dt, h);
            self.trace.push(
                DerivationStep::formula("Velocity parameter Vm", "Vm = 0.65 · ∛(V1 · ΔT / H)")
                    .operand("V1", v1)
                    .operand("ΔT", dt)
                    .operand("H", h)
                    .result(vm),
            );
            self.coefficients.vm = Some(vm);
        }

        let vm_prime = physics::exit_velocity_parameter(w0, d, h);
        self.trace.push(
            DerivationStep::formula("Velocity parameter Vm'", "Vm' = 1.3 · W0 · D / H")
                .operand("W0", w0)
                .operand("D", d)
                .operand("H", h)
                .result(vm_prime),
        );
        self.coefficients.vm_prime = Some(vm_prime);

        if !self.cold {
            let fe = physics::exit_buoyancy_parameter(vm_prime);
            self.trace.push(
                DerivationStep::formula("Parameter fe", "fe = 800 · (Vm')³")
                    .operand("Vm'", vm_prime)
                    .result(fe),
            );
            self.coefficients.fe = Some(fe);
        }

        debug!(
            "Source parameters: f={:?}, Vm={:?}, Vm'={}, fe={:?}",
            self.coefficients.f, self.coefficients.vm, vm_prime, self.coefficients.fe
        );
        self.complete(Stage::ParametersComputed);
        Ok(())
    }

    /// Compute the momentum coefficient m of a hot source.
    ///
    /// # Errors
    /// - [`DispersionError::StageNotApplicable`] for a cold source
    /// - [`DispersionError::StageOrder`] before [`parameters`](Self::parameters)
    /// - [`DispersionError::OutOfDomain`] when f or fe is NaN
    pub fn m_coef(&mut self) -> Result<()> {
        if self.cold {
            return Err(DispersionError::StageNotApplicable {
                stage: Stage::MomentumReady,
                reason: "the momentum coefficient m is defined for hot sources only",
            });
        }
        self.enter(Stage::MomentumReady, &[Stage::ParametersComputed])?;

        let f = required("f", self.coefficients.f)?;
        let fe = required("fe", self.coefficients.fe)?;
        let (regime, m) = physics::momentum_coefficient(f, fe)?;

        self.trace
            .push(DerivationStep::regime(format!("for {}", regime.condition())));
        let step = match regime {
            MomentumRegime::ExitLimited => DerivationStep::formula(
                "Coefficient m",
                "m = 1 / (0.67 + 0.1 · √fe + 0.34 · ∛fe)",
            )
            .operand("fe", fe),
            MomentumRegime::Buoyant => DerivationStep::formula(
                "Coefficient m",
                "m = 1 / (0.67 + 0.1 · √f + 0.34 · ∛f)",
            )
            .operand("f", f),
            MomentumRegime::Jet => {
                DerivationStep::formula("Coefficient m", "m = 1.47 / ∛f").operand("f", f)
            }
        };
        self.trace.push(step.result(m));

        debug!("Momentum coefficient m={} ({})", m, regime);
        self.coefficients.m = Some(m);
        self.coefficients.momentum_regime = Some(regime);
        self.complete(Stage::MomentumReady);
        Ok(())
    }

    /// Compute the wind coefficient n from Vm (hot) or Vm' (cold).
    ///
    /// # Errors
    /// - [`DispersionError::StageOrder`] before [`parameters`](Self::parameters),
    ///   or before [`m_coef`](Self::m_coef) for a hot source
    /// - [`DispersionError::OutOfDomain`] for a negative reference velocity
    pub fn n_coef(&mut self) -> Result<()> {
        let prerequisites: &[Stage] = if self.cold {
            &[Stage::ParametersComputed]
        } else {
            &[Stage::ParametersComputed, Stage::MomentumReady]
        };
        self.enter(Stage::WindReady, prerequisites)?;

        let (symbol, v) = if self.cold {
            ("Vm'", required("Vm'", self.coefficients.vm_prime)?)
        } else {
            ("Vm", required("Vm", self.coefficients.vm)?)
        };
        let (regime, n) = physics::wind_coefficient(v)?;

        if self.cold {
            self.trace.push(DerivationStep::heading(
                "For a cold source n is determined from Vm'",
            ));
        }
        self.trace.push(DerivationStep::regime(format!(
            "for {}",
            regime.condition().replace('V', symbol)
        )));
        let label = format!("Coefficient n (V = {symbol})");
        let step = match regime {
            WindRegime::Fast => DerivationStep::formula(label, "n = 1"),
            WindRegime::Moderate => {
                DerivationStep::formula(label, "n = 0.532 · V² − 2.13 · V + 3.13").operand("V", v)
            }
            WindRegime::Slow => DerivationStep::formula(label, "n = 4.4 · V").operand("V", v),
        };
        self.trace.push(step.result(n));

        debug!("Wind coefficient n={} ({}, {}={})", n, regime, symbol, v);
        self.coefficients.n = Some(n);
        self.coefficients.wind_regime = Some(regime);
        self.complete(Stage::WindReady);
        Ok(())
    }

    /// Compute the maximum ground-level concentration Cm.
    ///
    /// A, F and η are fixed by the first stage that succeeds: if
    /// [`pdv_func`](Self::pdv_func) ran earlier its values are kept and the
    /// ones in `pollutant` are ignored. A call that returns an error records
    /// nothing.
    ///
    /// # Errors
    /// - [`DispersionError::StageOrder`] before [`n_coef`](Self::n_coef)
    /// - [`DispersionError::InvalidInput`] for non-finite inputs
    /// - [`DispersionError::OutOfDomain`] when the result is not finite
    ///   (e.g. zero flow)
    pub fn max_concentrate(&mut self, pollutant: &PollutantParams) -> Result<()> {
        self.enter(Stage::ConcentrationReady, &[Stage::WindReady])?;
        pollutant.validate()?;

        let mass_rate = pollutant.mass_rate;
        let factors = self.effective_factors(&pollutant.factors);
        let n = required("n", self.coefficients.n)?;
        let (height, diameter, v1, dt) = (
            self.height,
            self.diameter,
            self.flow_rate,
            self.temperature_excess,
        );

        let mut steps = vec![DerivationStep::heading("Maximum concentration Cm")];
        let (k, cm) = if self.cold {
            let k = ensure_finite("K", physics::cold_dilution_factor(diameter, v1))?;
            steps.push(
                DerivationStep::formula("Dilution factor", "K = D / (8 · V1)")
                    .operand("D", diameter)
                    .operand("V1", v1)
                    .result(k),
            );

            let cm = physics::cold_max_concentration(&factors, mass_rate, n, height, k);
            steps.push(
                DerivationStep::formula(
                    "Maximum concentration",
                    "Cm = A · M · F · n · η / H^(4/3) · K",
                )
                .operand("A", factors.stratification)
                .operand("M", mass_rate)
                .operand("F", factors.settling)
                .operand("n", n)
                .operand("η", factors.terrain)
                .operand("H", height)
                .operand("K", k)
                .result(cm)
                .unit("mg/m³"),
            );
            (Some(k), cm)
        } else {
            let m = required("m", self.coefficients.m)?;
            let cm = physics::hot_max_concentration(&factors, mass_rate, m, n, height, v1, dt);
            steps.push(
                DerivationStep::formula(
                    "Maximum concentration",
                    "Cm = A · M · F · m · n · η / (H² · ∛(V1 · ΔT))",
                )
                .operand("A", factors.stratification)
                .operand("M", mass_rate)
                .operand("F", factors.settling)
                .operand("m", m)
                .operand("n", n)
                .operand("η", factors.terrain)
                .operand("H", height)
                .operand("V1", v1)
                .operand("ΔT", dt)
                .result(cm)
                .unit("mg/m³"),
            );
            (None, cm)
        };
        let cm = ensure_finite("Cm", cm)?;

        // Nothing below can fail
        self.commit_factors(&factors);
        self.mass_rate = Some(mass_rate);
        self.coefficients.k = k;
        self.trace.extend(steps);
        info!("Maximum concentration Cm={} mg/m³", cm);
        self.max_concentration = Some(cm);
        self.complete(Stage::ConcentrationReady);
        Ok(())
    }

    /// Compute the distance Xm at which Cm occurs.
    ///
    /// Cold sources and hot sources with f > 100 take d from Vm'; other hot
    /// sources take it from Vm, f and fe.
    ///
    /// # Errors
    /// - [`DispersionError::StageOrder`] before
    ///   [`max_concentrate`](Self::max_concentrate)
    /// - [`DispersionError::OutOfDomain`] for a negative velocity parameter
    pub fn max_distance(&mut self) -> Result<()> {
        self.enter(Stage::DistanceReady, &[Stage::ConcentrationReady])?;

        let settling = self.settling.value().ok_or(DispersionError::MissingValue("F"))?;
        let h = self.height;

        let jet_branch = self.cold || required("f", self.coefficients.f)? > 100.0;
        let (symbol, regime, d, step) = if jet_branch {
            let vm_prime = required("Vm'", self.coefficients.vm_prime)?;
            let (regime, d) = physics::jet_distance_coefficient(vm_prime)?;
            let step = match regime {
                DistanceRegime::Low => DerivationStep::formula("Distance coefficient", "d = 5.7"),
                DistanceRegime::Intermediate => {
                    DerivationStep::formula("Distance coefficient", "d = 11.4 · Vm'")
                        .operand("Vm'", vm_prime)
                }
                DistanceRegime::High => {
                    DerivationStep::formula("Distance coefficient", "d = 16 · √Vm'")
                        .operand("Vm'", vm_prime)
                }
            };
            ("Vm'", regime, d, step)
        } else {
            let vm = required("Vm", self.coefficients.vm)?;
            let f = required("f", self.coefficients.f)?;
            let fe = required("fe", self.coefficients.fe)?;
            let (regime, d) = physics::buoyant_distance_coefficient(vm, f, fe)?;
            let step = match regime {
                DistanceRegime::Low => {
                    DerivationStep::formula("Distance coefficient", "d = 2.48 · (1 + 0.28 · ∛fe)")
                        .operand("fe", fe)
                }
                DistanceRegime::Intermediate => DerivationStep::formula(
                    "Distance coefficient",
                    "d = 4.95 · Vm · (1 + 0.28 · ∛f)",
                )
                .operand("Vm", vm)
                .operand("f", f),
                DistanceRegime::High => DerivationStep::formula(
                    "Distance coefficient",
                    "d = 7 · √Vm · (1 + 0.28 · ∛f)",
                )
                .operand("Vm", vm)
                .operand("f", f),
            };
            ("Vm", regime, d, step)
        };

        let xm = ensure_finite("Xm", physics::max_concentration_distance(settling, h, d))?;
        self.trace.extend([
            DerivationStep::heading("Distance Xm"),
            DerivationStep::regime(format!("for {}", regime.condition(symbol))),
            step.result(d),
            DerivationStep::formula("Distance to maximum concentration", "Xm = (5 − F) / 4 · H · d")
                .operand("F", settling)
                .operand("H", h)
                .operand("d", d)
                .result(xm)
                .unit("m"),
        ]);

        info!("Distance to maximum Xm={} m (d={})", xm, d);
        self.coefficients.d = Some(d);
        self.coefficients.distance_regime = Some(regime);
        self.max_distance = Some(xm);
        self.complete(Stage::DistanceReady);
        Ok(())
    }

    /// Compute the maximum permissible emission for `limit`.
    ///
    /// A, F and η are fixed by the first stage that succeeds, as in
    /// [`max_concentrate`](Self::max_concentrate). A call that returns an
    /// error records nothing.
    ///
    /// # Errors
    /// - [`DispersionError::StageOrder`] before [`n_coef`](Self::n_coef)
    /// - [`DispersionError::InvalidInput`] for non-finite inputs
    /// - [`DispersionError::OutOfDomain`] when the result is not finite
    pub fn pdv_func(&mut self, limit: &EmissionLimit) -> Result<()> {
        self.enter(Stage::MpeReady, &[Stage::WindReady])?;
        limit.validate()?;

        let factors = self.effective_factors(&limit.factors);
        let allowance = limit.threshold - limit.background;
        let n = required("n", self.coefficients.n)?;
        let (height, diameter, v1, dt) = (
            self.height,
            self.diameter,
            self.flow_rate,
            self.temperature_excess,
        );

        let (pdv, step) = if self.cold {
            let pdv = physics::cold_permissible_emission(&factors, allowance, n, height, v1, diameter);
            let step = DerivationStep::formula(
                "Maximum permissible emission",
                "ПДВ = (ПДК − Cf) · H^(4/3) · 8 · V1 / (A · F · n · η · D)",
            )
            .operand("ПДК", limit.threshold)
            .operand("Cf", limit.background)
            .operand("H", height)
            .operand("V1", v1)
            .operand("A", factors.stratification)
            .operand("F", factors.settling)
            .operand("n", n)
            .operand("η", factors.terrain)
            .operand("D", diameter)
            .result(pdv);
            (pdv, step)
        } else {
            let m = required("m", self.coefficients.m)?;
            let pdv = physics::hot_permissible_emission(&factors, allowance, m, n, height, v1, dt);
            let step = DerivationStep::formula(
                "Maximum permissible emission",
                "ПДВ = (ПДК − Cf) · H² · ∛(V1 · ΔT) / (A · F · m · n · η)",
            )
            .operand("ПДК", limit.threshold)
            .operand("Cf", limit.background)
            .operand("H", height)
            .operand("V1", v1)
            .operand("ΔT", dt)
            .operand("A", factors.stratification)
            .operand("F", factors.settling)
            .operand("m", m)
            .operand("n", n)
            .operand("η", factors.terrain)
            .result(pdv);
            (pdv, step)
        };
        let pdv = ensure_finite("ПДВ", pdv)?;

        self.commit_factors(&factors);
        self.threshold = Some(limit.threshold);
        self.background = Some(limit.background);
        self.trace.extend([
            DerivationStep::heading("Maximum permissible emission (ПДВ)"),
            step.unit("g/s"),
        ]);
        info!("Maximum permissible emission ПДВ={} g/s", pdv);
        self.permissible_emission = Some(pdv);
        self.complete(Stage::MpeReady);
        Ok(())
    }

    /// Run every applicable stage in order and return the report.
    ///
    /// Cm and Xm are computed when `pollutant` is given, the permissible
    /// emission when `limit` is given.
    ///
    /// # Errors
    /// Whatever the individual stages return.
    pub fn run_all(
        &mut self,
        pollutant: Option<&PollutantParams>,
        limit: Option<&EmissionLimit>,
    ) -> Result<DispersionReport> {
        self.parameters()?;
        if !self.cold {
            self.m_coef()?;
        }
        self.n_coef()?;
        if let Some(pollutant) = pollutant {
            self.max_concentrate(pollutant)?;
            self.max_distance()?;
        }
        if let Some(limit) = limit {
            self.pdv_func(limit)?;
        }
        Ok(self.report())
    }

    /// Snapshot of the current state
    pub fn report(&self) -> DispersionReport {
        DispersionReport {
            cold: self.cold,
            rectangular: self.rectangular,
            diameter: self.diameter,
            height: self.height,
            temperature_excess: self.temperature_excess,
            exit_velocity: self.exit_velocity,
            flow_rate: self.flow_rate,
            coefficients: self.coefficients,
            stratification: self.stratification.value(),
            settling: self.settling.value(),
            terrain: self.terrain.value(),
            max_concentration: self.max_concentration,
            max_distance: self.max_distance,
            permissible_emission: self.permissible_emission,
            stage: self.current,
            trace: self.trace.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Cold-source formulas apply
    pub fn is_cold(&self) -> bool {
        self.cold
    }

    /// The outlet is rectangular
    pub fn is_rectangular(&self) -> bool {
        self.rectangular
    }

    /// D, or the equivalent diameter of a rectangular outlet (m)
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// H (m)
    pub fn height(&self) -> f64 {
        self.height
    }

    /// ΔT = max(Tg − Tv, 0) (°C)
    pub fn temperature_excess(&self) -> f64 {
        self.temperature_excess
    }

    /// W0 (m/s)
    pub fn exit_velocity(&self) -> f64 {
        self.exit_velocity
    }

    /// V1 (m³/s)
    pub fn flow_rate(&self) -> f64 {
        self.flow_rate
    }

    /// All derived coefficients
    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// f
    pub fn f(&self) -> Option<f64> {
        self.coefficients.f
    }

    /// Vm
    pub fn vm(&self) -> Option<f64> {
        self.coefficients.vm
    }

    /// Vm'
    pub fn vm_prime(&self) -> Option<f64> {
        self.coefficients.vm_prime
    }

    /// fe
    pub fn fe(&self) -> Option<f64> {
        self.coefficients.fe
    }

    /// m
    pub fn m(&self) -> Option<f64> {
        self.coefficients.m
    }

    /// n
    pub fn n(&self) -> Option<f64> {
        self.coefficients.n
    }

    /// A as fixed by the first stage that used it
    pub fn stratification(&self) -> Option<f64> {
        self.stratification.value()
    }

    /// F as fixed by the first stage that used it
    pub fn settling(&self) -> Option<f64> {
        self.settling.value()
    }

    /// η as fixed by the first stage that used it
    pub fn terrain(&self) -> Option<f64> {
        self.terrain.value()
    }

    /// M supplied to [`max_concentrate`](Self::max_concentrate)
    pub fn mass_rate(&self) -> Option<f64> {
        self.mass_rate
    }

    /// ПДК and Cf supplied to [`pdv_func`](Self::pdv_func)
    pub fn emission_limit(&self) -> Option<(f64, f64)> {
        self.threshold.zip(self.background)
    }

    /// Cm (mg/m³)
    pub fn cm(&self) -> Option<f64> {
        self.max_concentration
    }

    /// Xm (m)
    pub fn xm(&self) -> Option<f64> {
        self.max_distance
    }

    /// ПДВ (g/s)
    pub fn pdv(&self) -> Option<f64> {
        self.permissible_emission
    }

    /// Derivation so far
    pub fn trace(&self) -> &DerivationTrace {
        &self.trace
    }

    /// Most recently completed stage
    pub fn current_stage(&self) -> Stage {
        self.current
    }

    /// Every completed stage
    pub fn completed_stages(&self) -> CompletedStages {
        self.completed
    }

    /// Whether `stage` has completed
    pub fn is_completed(&self, stage: Stage) -> bool {
        self.completed.contains(stage)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn class_name(&self) -> &'static str {
        if self.cold {
            "cold"
        } else {
            "hot"
        }
    }

    fn enter(&self, stage: Stage, prerequisites: &[Stage]) -> Result<()> {
        if self.completed.contains(stage) {
            return Err(DispersionError::StageRepeated(stage));
        }
        if let Some(&missing) = prerequisites
            .iter()
            .find(|s| !self.completed.contains(**s))
        {
            return Err(DispersionError::StageOrder {
                stage,
                required: missing,
                current: self.current,
            });
        }
        Ok(())
    }

    fn complete(&mut self, stage: Stage) {
        self.completed.insert(stage);
        self.current = stage;
    }

    /// A, F and η a stage should use: the fixed values once a stage has
    /// succeeded, otherwise `requested`
    fn effective_factors(&self, requested: &RegionalFactors) -> RegionalFactors {
        let effective = RegionalFactors {
            stratification: self
                .stratification
                .value()
                .unwrap_or(requested.stratification),
            settling: self.settling.value().unwrap_or(requested.settling),
            terrain: self.terrain.value().unwrap_or(requested.terrain),
        };
        if effective != *requested {
            debug!(
                "Regional coefficients already fixed, keeping A={}, F={}, η={}",
                effective.stratification, effective.settling, effective.terrain
            );
        }
        effective
    }

    fn commit_factors(&mut self, factors: &RegionalFactors) {
        if self.stratification.set(factors.stratification) {
            self.settling.set(factors.settling);
            self.terrain.set(factors.terrain);
            debug!(
                "Regional coefficients fixed: A={}, F={}, η={}",
                factors.stratification, factors.settling, factors.terrain
            );
        }
    }
}

fn required(symbol: &'static str, value: Option<f64>) -> Result<f64> {
    value.ok_or(DispersionError::MissingValue(symbol))
}
