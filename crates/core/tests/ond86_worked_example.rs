//! Reference scenarios checked against the OND-86 formulas evaluated on
//! rounded intermediates
use approx::assert_abs_diff_eq;
use ond_dispersion_core::physics::{round3, DistanceRegime, MomentumRegime, METHODOLOGY_PI};
use ond_dispersion_core::{
    DispersionCalculator, EmissionLimit, PollutantParams, SourceParams, Stage, StepKind,
};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Cold source with a 0.875 x 0.35 m rectangular outlet
fn worked_example() -> SourceParams {
    SourceParams::default()
        .with_flow_rate(0.98)
        .with_height(25.0)
        .with_rectangular_outlet(0.875, 0.35)
        .with_temperatures(25.0, 25.0)
}

#[test]
fn test_worked_example_end_to_end() {
    let mut calc = DispersionCalculator::new(worked_example()).unwrap();
    assert!(calc.is_cold());
    assert!(calc.is_rectangular());
    assert_eq!(calc.temperature_excess(), 0.0);

    // Equivalent circle
    assert_eq!(calc.diameter(), round3(2.0 * 0.875 * 0.35 / (0.875 + 0.35)));
    assert_eq!(calc.diameter(), 0.5);
    assert_eq!(calc.exit_velocity(), 3.2);
    assert_eq!(calc.flow_rate(), 0.628);

    let report = calc
        .run_all(
            Some(&PollutantParams::new(16.0, 1.0)),
            Some(&EmissionLimit::new(1.5, 0.3)),
        )
        .unwrap();

    let c = &report.coefficients;
    assert_eq!(c.vm_prime, Some(0.083));
    assert_eq!(c.n, Some(0.365));
    assert_eq!(c.k, Some(0.1));
    assert_eq!(c.f, None);
    assert_eq!(c.m, None);
    assert_eq!(c.d, Some(5.7));

    let h = 25.0_f64;
    let expected_cm = round3(160.0 * 16.0 * 0.365 / h.powf(4.0 / 3.0) * 0.1);
    assert_eq!(report.max_concentration, Some(expected_cm));
    assert_eq!(report.max_concentration, Some(1.278));

    assert_eq!(report.max_distance, Some(round3((5.0 - 1.0) / 4.0 * h * 5.7)));
    assert_eq!(report.max_distance, Some(142.5));

    let expected_pdv =
        round3((1.5 - 0.3) * h.powf(4.0 / 3.0) * 8.0 * 0.628 / (160.0 * 0.365 * 0.5));
    assert_eq!(report.permissible_emission, Some(expected_pdv));
    assert_eq!(report.permissible_emission, Some(15.093));

    assert_eq!(report.stage, Stage::MpeReady);
}

#[test]
fn test_worked_example_trace() {
    let mut calc = DispersionCalculator::new(worked_example()).unwrap();
    calc.run_all(Some(&PollutantParams::new(16.0, 1.0)), None)
        .unwrap();
    let trace = calc.trace();

    let first = &trace.steps()[0];
    assert_eq!(first.kind, StepKind::Heading);
    assert!(first.label.contains("rectangular outlet (cold)"));

    let d_eq = trace.find_formula("Equivalent diameter").unwrap();
    assert_eq!(d_eq.operand_value("L"), Some(0.875));
    assert_eq!(d_eq.result, Some(0.5));

    // A cold source never records f, Vm or fe
    assert!(trace.find_formula("Buoyancy parameter").is_none());
    assert!(trace
        .iter()
        .any(|s| s.label == "For a cold source n is determined from Vm'"));

    let cm = trace.find_formula("Maximum concentration").unwrap();
    assert_eq!(cm.operand_value("K"), Some(0.1));
    assert_eq!(cm.unit, Some("mg/m³"));

    let text = trace.to_string();
    assert!(text.contains("Vm' < 0.5"));
    assert!(text.contains("= 142.5 m"));
}

#[test]
fn test_flow_round_trip() {
    for &(w0, d) in &[(5.0, 0.25), (7.3, 0.4), (12.0, 1.2), (0.8, 2.5), (20.0, 0.1)] {
        let forward = DispersionCalculator::new(
            SourceParams::default().with_exit_velocity(w0).with_diameter(d),
        )
        .unwrap();
        let v1 = forward.flow_rate();
        assert_eq!(v1, round3(0.785 * w0 * d.powi(2)));

        let back = DispersionCalculator::new(
            SourceParams::default().with_flow_rate(v1).with_diameter(d),
        )
        .unwrap();
        // V1 carries at most 0.0005 of rounding, scaled back by the area
        let tolerance = 0.0005 / (0.785 * d.powi(2)) + 0.0005;
        assert_abs_diff_eq!(back.exit_velocity(), w0, epsilon = tolerance);
    }
}

#[test]
fn test_flow_rounds_exact_binary_value() {
    // 0.785 · 1.5 is stored just below 1.1775
    let calc = DispersionCalculator::new(
        SourceParams::default().with_exit_velocity(1.5).with_diameter(1.0),
    )
    .unwrap();
    assert_eq!(calc.flow_rate(), 1.177);

    let step = calc.trace().find_formula("Volumetric flow").unwrap();
    assert_eq!(step.result, Some(1.177));
}

#[test]
fn test_cold_round_trip_computes_velocity_without_tracing_it() {
    let hot = DispersionCalculator::new(SourceParams::default().with_flow_rate(0.917)).unwrap();
    let cold =
        DispersionCalculator::new(SourceParams::default().with_flow_rate(0.917).cold()).unwrap();

    assert_eq!(hot.exit_velocity(), cold.exit_velocity());
    assert!(hot.trace().find_formula("Exit velocity").is_some());
    assert!(cold.trace().find_formula("Exit velocity").is_none());
}

#[test]
fn test_rectangular_outlet_is_lossy() {
    for &(l, b, v1) in &[(0.875, 0.35, 0.98), (1.0, 0.5, 2.0), (2.0, 2.0, 10.0)] {
        let calc = DispersionCalculator::new(
            SourceParams::default()
                .with_flow_rate(v1)
                .with_rectangular_outlet(l, b),
        )
        .unwrap();

        let d_eq = round3(2.0 * l * b / (l + b));
        let w0 = round3(v1 / (l * b));
        let v1_eq = round3(METHODOLOGY_PI * d_eq.powi(2) / 4.0 * w0);
        assert_eq!(calc.diameter(), d_eq);
        assert_eq!(calc.exit_velocity(), w0);
        assert_eq!(calc.flow_rate(), v1_eq);
    }

    // The equivalent circle does not preserve the original flow
    let calc = DispersionCalculator::new(worked_example()).unwrap();
    assert_ne!(calc.flow_rate(), 0.98);
}

#[test]
fn test_hot_concentration_uses_rounded_intermediates() {
    // Defaults: D = 0.25, H = 30, Tg = 100, Tv = 26
    let mut calc =
        DispersionCalculator::new(SourceParams::default().with_exit_velocity(5.0)).unwrap();
    let report = calc
        .run_all(Some(&PollutantParams::new(16.0, 1.0)), None)
        .unwrap();
    let coef = report.coefficients;

    assert_eq!(report.flow_rate, 0.245);
    assert_eq!(coef.f, Some(0.094));
    assert_eq!(coef.vm, Some(0.55));
    assert_eq!(coef.vm_prime, Some(0.054));
    assert_eq!(coef.fe, Some(0.126));
    assert_eq!(coef.m, Some(1.169));
    assert_eq!(coef.n, Some(2.119));
    assert_eq!(coef.k, None);

    let (m, n, h, v1, dt) = (1.169, 2.119, 30.0_f64, 0.245_f64, 74.0);
    let expected = round3(160.0 * 16.0 * m * n / (h.powi(2) * (v1 * dt).cbrt()));
    assert_eq!(report.max_concentration, Some(expected));

    // f ≤ 100 and 0.5 < Vm ≤ 2: d from Vm and f, unrounded
    let distance_coef = 4.95 * 0.55 * (1.0 + 0.28 * 0.094_f64.cbrt());
    assert_abs_diff_eq!(coef.d.unwrap(), distance_coef, epsilon = 1e-12);
    assert_eq!(report.max_distance, Some(round3(h * distance_coef)));
}

/// Hot source with W0 = 20, D = 1, H = 20 and the given temperature excess
fn fast_jet(temperature_excess: f64) -> DispersionCalculator {
    DispersionCalculator::new(
        SourceParams::default()
            .with_exit_velocity(20.0)
            .with_diameter(1.0)
            .with_height(20.0)
            .with_temperatures(26.0 + temperature_excess, 26.0),
    )
    .unwrap()
}

#[test]
fn test_strong_jet_takes_distance_from_exit_velocity() {
    // f = 1000 · 400 · 1 / (400 · 8) = 125
    let mut calc = fast_jet(8.0);
    let report = calc
        .run_all(
            Some(&PollutantParams::new(16.0, 1.0)),
            Some(&EmissionLimit::new(0.5, 0.0)),
        )
        .unwrap();
    let coef = report.coefficients;

    assert_eq!(report.flow_rate, 15.7);
    assert_eq!(coef.f, Some(125.0));
    assert_eq!(coef.vm, Some(1.199));
    assert_eq!(coef.vm_prime, Some(1.3));
    assert_eq!(coef.fe, Some(1757.6));
    assert_eq!(coef.momentum_regime, Some(MomentumRegime::Jet));
    assert_eq!(coef.m, Some(0.294));
    assert_eq!(coef.n, Some(1.341));
    assert_eq!(report.max_concentration, Some(0.504));
    assert_eq!(report.permissible_emission, Some(15.878));

    // f > 100: 0.5 < Vm' ≤ 2 gives d = 11.4 · Vm'
    assert_eq!(coef.distance_regime, Some(DistanceRegime::Intermediate));
    assert_abs_diff_eq!(coef.d.unwrap(), 11.4 * 1.3, epsilon = 1e-12);
    assert_eq!(report.max_distance, Some(round3(20.0 * coef.d.unwrap())));
    assert_eq!(report.max_distance, Some(296.4));

    let trace = calc.trace().to_string();
    assert!(trace.contains("for f ≥ 100"));
    assert!(trace.contains("for 0.5 < Vm' ≤ 2"));
    let step = calc.trace().find_formula("Distance coefficient").unwrap();
    assert_eq!(step.formula, Some("d = 11.4 · Vm'"));
}

#[test]
fn test_jet_boundary_keeps_buoyant_distance() {
    // f = 100 exactly: m takes the jet formula, d still comes from Vm and f
    let mut calc = fast_jet(10.0);
    let report = calc
        .run_all(Some(&PollutantParams::new(16.0, 1.0)), None)
        .unwrap();
    let coef = report.coefficients;

    assert_eq!(coef.f, Some(100.0));
    assert_eq!(coef.momentum_regime, Some(MomentumRegime::Jet));
    assert_eq!(coef.m, Some(0.317));
    assert_eq!(coef.vm, Some(1.292));
    assert_eq!(coef.n, Some(1.266));
    assert_eq!(report.max_concentration, Some(0.476));

    assert_eq!(coef.distance_regime, Some(DistanceRegime::Intermediate));
    let distance_coef = 4.95 * 1.292 * (1.0 + 0.28 * 100.0_f64.cbrt());
    assert_abs_diff_eq!(coef.d.unwrap(), distance_coef, epsilon = 1e-12);
    assert_eq!(report.max_distance, Some(round3(20.0 * distance_coef)));
    assert_abs_diff_eq!(report.max_distance.unwrap(), 294.143, epsilon = 1e-9);

    let step = calc.trace().find_formula("Distance coefficient").unwrap();
    assert_eq!(step.formula, Some("d = 4.95 · Vm · (1 + 0.28 · ∛f)"));
    assert_eq!(step.operand_value("f"), Some(100.0));
}

#[test]
fn test_hot_permissible_emission() {
    let mut calc =
        DispersionCalculator::new(SourceParams::default().with_exit_velocity(5.0)).unwrap();
    calc.run_all(None, Some(&EmissionLimit::new(0.5, 0.0)))
        .unwrap();

    let expected = round3(0.5 * 900.0 * (0.245_f64 * 74.0).cbrt() / (160.0 * 1.169 * 2.119));
    assert_eq!(calc.pdv(), Some(expected));
    assert_eq!(calc.pdv(), Some(2.983));
    assert_eq!(calc.cm(), None);
}

#[test]
fn test_report_serializes_to_json() {
    let mut calc = DispersionCalculator::new(worked_example()).unwrap();
    let report = calc
        .run_all(
            Some(&PollutantParams::new(16.0, 1.0)),
            Some(&EmissionLimit::new(1.5, 0.3)),
        )
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["cold"], true);
    assert_eq!(json["max_concentration"], 1.278);
    assert_eq!(json["coefficients"]["n"], 0.365);
    assert_eq!(json["coefficients"]["wind_regime"], "Slow");
    assert_eq!(json["stratification"], 160.0);
    assert_eq!(json["stage"], "MpeReady");
    assert!(json["trace"].as_array().is_some_and(|steps| !steps.is_empty()));
}
