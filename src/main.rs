//! Epoch entry point: CLI wiring around the optimiser.

mod cli;

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};

use epoch::config::EngineConfig;
use epoch::data::{HistoricalData, SyntheticSite};
use epoch::error::EpochError;
use epoch::io::export::export_trace_csv;
use epoch::logging::init_logging;
use epoch::optimiser::Optimiser;
use epoch::params::{ParameterGrid, ScenarioConfig};
use epoch::sim::SimulationResult;

use cli::{Cli, Command, RunArgs};

/// JSON printed by `recall`.
#[derive(Serialize)]
struct RecallReport<'a> {
    config: &'a ScenarioConfig,
    result: &'a SimulationResult,
    trace: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let args = cli.run_args();
    let mut config = load_config(args)?;
    if let Some(dir) = &args.output {
        config.output.directory = dir.clone();
    }
    let output_dir = config.output.directory.clone();

    let data = load_data(args)?;
    let grid = ParameterGrid::from_json_file(&args.grid)?;
    let mut optimiser = Optimiser::new(config, data)?;

    match &cli.command {
        Command::Optimise(_) => {
            let out = optimiser.optimise(&grid)?;
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Initialise(_) => {
            let out = optimiser.initialise(&grid)?;
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Recall { index, .. } => {
            let rep = optimiser.reproduce(&grid, *index)?;
            fs::create_dir_all(&output_dir)
                .with_context(|| format!("creating {}", output_dir.display()))?;
            let path = output_dir.join(format!("scenario_{index}.csv"));
            export_trace_csv(&rep.trace, rep.config.timestep_hours, &path)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(index, path = %path.display(), "wrote scenario trace");

            let report = RecallReport {
                config: &rep.config,
                result: &rep.result,
                trace: path.display().to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn load_config(args: &RunArgs) -> Result<EngineConfig> {
    let config = match (&args.config, &args.preset) {
        (Some(path), _) => EngineConfig::from_toml_file(path).map_err(EpochError::from)?,
        (None, Some(name)) => EngineConfig::from_preset(name).map_err(EpochError::from)?,
        (None, None) => EngineConfig::default(),
    };
    Ok(config)
}

fn load_data(args: &RunArgs) -> Result<HistoricalData> {
    match (&args.data, args.synthetic_seed) {
        (Some(path), _) => Ok(HistoricalData::from_csv_file(path)?),
        (None, Some(seed)) => {
            info!(seed, "generating synthetic site year");
            Ok(SyntheticSite::hourly_year(seed).generate()?)
        }
        (None, None) => bail!("either --data or --synthetic-seed is required"),
    }
}
