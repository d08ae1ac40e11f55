use clap::Parser;
use ond_dispersion_core::core_types::RegionalFactors;
use ond_dispersion_core::{DispersionCalculator, EmissionLimit, PollutantParams, SourceParams};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// OND-86 single-source dispersion calculation.
///
/// With no arguments the cold rectangular-outlet reference scenario is run.
#[derive(Parser, Debug)]
#[command(name = "ond-demo")]
#[command(about = "OND-86 single stack dispersion calculator", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Args {
    /// Exit velocity W0 in m/s (replaces V1). A rectangular outlet is driven
    /// by V1 only, so this needs --circular
    #[arg(long, requires = "circular")]
    w0: Option<f64>,

    /// Volumetric flow V1 in m³/s, used when W0 is not given
    #[arg(long, default_value_t = 0.98)]
    v1: f64,

    /// Outlet diameter D in m (circular outlet)
    #[arg(short = 'd', long, default_value_t = 0.25)]
    diameter: f64,

    /// Stack height H in m
    #[arg(short = 'H', long, default_value_t = 25.0)]
    height: f64,

    /// Exhaust temperature Tg in °C
    #[arg(long, default_value_t = 25.0)]
    tg: f64,

    /// Ambient air temperature Tv in °C
    #[arg(long, default_value_t = 25.0)]
    tv: f64,

    /// Rectangular outlet length L in m
    #[arg(short = 'L', long, default_value_t = 0.875)]
    length: f64,

    /// Rectangular outlet width b in m
    #[arg(short = 'b', long, default_value_t = 0.35)]
    width: f64,

    /// Circular outlet of diameter D instead of the L x b rectangle
    #[arg(long)]
    circular: bool,

    /// Force the cold-source formulas
    #[arg(long)]
    cold: bool,

    /// Pollutant mass emission rate M in g/s
    #[arg(short = 'M', long, default_value_t = 16.0)]
    mass_rate: f64,

    /// Settling coefficient F
    #[arg(short = 'F', long, default_value_t = 1.0)]
    settling: f64,

    /// Temperature stratification coefficient A
    #[arg(short = 'A', long, default_value_t = 160.0)]
    stratification: f64,

    /// Terrain coefficient η
    #[arg(long, default_value_t = 1.0)]
    nu: f64,

    /// Maximum permissible concentration ПДК in mg/m³
    #[arg(long, default_value_t = 1.5)]
    pdk: f64,

    /// Background concentration Cf in mg/m³
    #[arg(long, default_value_t = 0.3)]
    cf: f64,

    /// Skip the Cm / Xm calculation
    #[arg(long)]
    no_concentration: bool,

    /// Skip the permissible emission calculation
    #[arg(long)]
    no_pdv: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn source(&self) -> SourceParams {
        let mut source = SourceParams::default()
            .with_diameter(self.diameter)
            .with_height(self.height)
            .with_temperatures(self.tg, self.tv);
        source = match self.w0 {
            Some(w0) => source.with_exit_velocity(w0),
            None => source.with_flow_rate(self.v1),
        };
        if !self.circular {
            source = source.with_rectangular_outlet(self.length, self.width);
        }
        if self.cold {
            source = source.cold();
        }
        source
    }

    fn factors(&self) -> RegionalFactors {
        RegionalFactors {
            stratification: self.stratification,
            settling: self.settling,
            terrain: self.nu,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut calc = match DispersionCalculator::new(args.source()) {
        Ok(calc) => calc,
        Err(e) => {
            error!("Invalid source: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pollutant = PollutantParams {
        mass_rate: args.mass_rate,
        factors: args.factors(),
    };
    let limit = EmissionLimit::new(args.pdk, args.cf).with_factors(args.factors());

    let report = match calc.run_all(
        (!args.no_concentration).then_some(&pollutant),
        (!args.no_pdv).then_some(&limit),
    ) {
        Ok(report) => report,
        Err(e) => {
            error!("Calculation failed at {}: {e}", calc.current_stage());
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Could not serialize report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("=== OND-86 Dispersion Calculation ===\n");
        println!("{}", report.trace);
        println!("=== Summary ===\n");
        print!("{report}");
    }
    ExitCode::SUCCESS
}
