use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Parameter-sweep optimiser for site energy systems.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging for this crate (overrides RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sweep the whole grid and write per-objective CSV reports.
    Optimise(RunArgs),
    /// Sweep the first 100 scenarios and estimate the full sweep time.
    Initialise(RunArgs),
    /// Rebuild one scenario and write its per-timestep trace.
    Recall {
        #[command(flatten)]
        run: RunArgs,
        /// 1-based scenario index.
        #[arg(long)]
        index: u64,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Parameter grid JSON.
    #[arg(short, long)]
    pub grid: PathBuf,

    /// Site CSV with one row per timestep.
    #[arg(short, long, conflicts_with = "synthetic_seed")]
    pub data: Option<PathBuf>,

    /// Generate an hourly synthetic site year from this seed instead of --data.
    #[arg(long)]
    pub synthetic_seed: Option<u64>,

    /// Engine configuration TOML.
    #[arg(short, long, conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Built-in engine configuration (default, single_thread, wide).
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Report directory, overriding the configuration.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn run_args(&self) -> &RunArgs {
        match &self.command {
            Command::Optimise(run) | Command::Initialise(run) => run,
            Command::Recall { run, .. } => run,
        }
    }
}
