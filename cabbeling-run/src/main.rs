//! # Cabbeling experiment runner
//!
//! Prepares a two-layer experiment from a TOML file and hands it to the
//! preview engine:
//!
//! ```sh
//! cargo run -p cabbeling-run -- cabbeling-run/experiments/cabbeling.toml
//! ```

mod config;
mod preview;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use cabbeling_setup::{engine::SimulationEngine, run::Experiment};
use cabbeling_thermo::{
    EquationOfState,
    model::{eos80::Eos80, linear::LinearEos},
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use uom::si::mass_density::kilogram_per_cubic_meter;

use config::RunFile;
use preview::PreviewEngine;

fn command() -> Command {
    Command::new("cabbeling-run")
        .about("Prepares initial conditions and grids for two-layer cabbeling experiments")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("path")
                .help("Path of the experiment config file")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .required_unless_present("print-default"),
        )
        .arg(
            Arg::new("eos")
                .long("eos")
                .help("Equation of state used for the buoyancy coefficients")
                .value_parser(["eos80", "linear"])
                .default_value("eos80"),
        )
        .arg(
            Arg::new("print-default")
                .long("print-default")
                .help("Print the default config file and exit")
                .action(ArgAction::SetTrue),
        )
}

fn main() -> Result<()> {
    let matches = command().get_matches();

    if matches.get_flag("print-default") {
        print!("{}", toml::to_string_pretty(&RunFile::default())?);
        return Ok(());
    }

    let path = matches
        .get_one::<PathBuf>("path")
        .ok_or(anyhow!("Failed to specify path argument"))?;
    let file = RunFile::load(path)?;

    env_logger::builder()
        .filter_level(file.logging.filter())
        .parse_default_env()
        .init();

    log::info!("Config: {}", path.display());
    log::info!(
        "Output: {}",
        file.experiment.output.path_for(file.experiment.condition.regime).display()
    );

    let experiment = Experiment::from_config(&file.experiment)
        .context("Failed to prepare experiment")?;
    let mut engine = PreviewEngine::new(file.experiment.closure);

    match eos_name(&matches) {
        "linear" => launch(&experiment, &mut engine, &LinearEos::default()),
        _ => launch(&experiment, &mut engine, &Eos80),
    }
}

fn eos_name(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("eos")
        .map_or("eos80", String::as_str)
}

fn launch<S, E>(experiment: &Experiment, engine: &mut S, eos: &E) -> Result<()>
where
    S: SimulationEngine,
    E: EquationOfState,
{
    let contrast = experiment
        .parameters()
        .density_contrast(eos)
        .context("Failed to evaluate the equation of state")?;
    log::info!(
        "Surface density contrast ρ_upper − ρ_lower = {:.4} kg/m³",
        contrast.get::<kilogram_per_cubic_meter>()
    );

    let report = experiment
        .launch(engine, eos)
        .with_context(|| format!("Failed to launch {} experiment", experiment.regime()))?;

    log::info!(
        "Pr = {:.4}, Sc = {:.4}, Le = {:.4}",
        report.prandtl,
        report.schmidt,
        report.lewis
    );
    match report.density_ratio {
        Some(ratio) => log::info!("Ra_ρ = {ratio:.6}"),
        None => log::info!("Ra_ρ undefined without a salinity contrast"),
    }
    Ok(())
}
