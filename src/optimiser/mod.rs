//! Parallel parameter sweep over a fixed worker pool.
//!
//! A run moves through [`RunPhase`] in order. Configuration errors surface
//! before any worker starts; once workers are running the sweep always
//! completes. Individual scenario defects are logged and ranked like any
//! other result.

pub mod output;
pub mod runtime;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::data::HistoricalData;
use crate::error::{EpochError, Result};
use crate::io::export::{ScenarioRow, export_results_csv};
use crate::league_table::{LeagueTable, Objective};
use crate::params::{ParameterGrid, ScenarioConfig};
use crate::sim::{ScenarioTrace, SimulationResult, Simulator};
use crate::task_generator::TaskGenerator;

pub use output::OptimisationOutput;
pub use runtime::{RuntimeStats, RuntimeSummary};

/// Name of the combined export over every retained scenario.
pub const ALL_RESULTS_FILE: &str = "all_results.csv";

/// Lifecycle of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    GridBuilt,
    WorkersRunning,
    Joined,
    Reported,
}

/// One scenario rebuilt from its index.
#[derive(Debug, Clone)]
pub struct Reproduction {
    pub config: ScenarioConfig,
    pub result: SimulationResult,
    pub trace: ScenarioTrace,
}

/// Runs sweeps of a parameter grid against one site dataset.
#[derive(Debug)]
pub struct Optimiser {
    config: EngineConfig,
    data: HistoricalData,
    simulator: Simulator,
    phase: RunPhase,
    last_grid: Option<ParameterGrid>,
}

impl Optimiser {
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: EngineConfig, data: HistoricalData) -> Result<Self> {
        if let Some(err) = config.validate().into_iter().next() {
            return Err(err.into());
        }
        Ok(Self {
            config,
            data,
            simulator: Simulator::new(),
            phase: RunPhase::Idle,
            last_grid: None,
        })
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn data(&self) -> &HistoricalData {
        &self.data
    }

    /// `min(hardware concurrency, configured cap)`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if hardware concurrency cannot be
    /// detected.
    pub fn worker_count(&self) -> Result<usize> {
        let hardware = thread::available_parallelism()
            .map_err(|e| EpochError::config(format!("cannot detect hardware concurrency: {e}")))?;
        Ok(hardware.get().min(self.config.optimiser.max_concurrency).max(1))
    }

    /// Full sweep: ranks every scenario and writes one CSV per objective
    /// plus [`ALL_RESULTS_FILE`].
    pub fn optimise(&mut self, grid: &ParameterGrid) -> Result<OptimisationOutput> {
        self.run(grid, false)
    }

    /// Capped sweep used to estimate the full sweep's wall-clock time.
    /// Writes no files.
    pub fn initialise(&mut self, grid: &ParameterGrid) -> Result<OptimisationOutput> {
        self.run(grid, true)
    }

    pub fn run(
        &mut self,
        grid: &ParameterGrid,
        initialisation_only: bool,
    ) -> Result<OptimisationOutput> {
        self.phase = RunPhase::Idle;
        let generator = TaskGenerator::new(grid, initialisation_only)?;
        self.last_grid = Some(grid.clone());
        self.advance(RunPhase::GridBuilt);

        let workers = self.worker_count()?;
        let table = LeagueTable::new(self.config.optimiser.leaderboard_capacity);
        let stats = RuntimeStats::new();
        info!(
            total_scenarios = generator.total_scenarios(),
            scenario_limit = generator.scenario_limit(),
            workers,
            initialisation_only,
            "starting sweep"
        );

        self.advance(RunPhase::WorkersRunning);
        self.sweep(&generator, &table, &stats, workers);
        self.advance(RunPhase::Joined);

        let runtime = stats.summary();
        let mut output = OptimisationOutput::from_table(
            &table,
            &runtime,
            generator.total_scenarios(),
            workers,
            initialisation_only,
        );

        if initialisation_only {
            if let Some(secs) = output.est_seconds {
                info!(
                    est_hours = secs / 3600.0,
                    total_scenarios = generator.total_scenarios(),
                    "estimated full sweep time"
                );
            }
            return Ok(output);
        }

        output.files = self.write_reports(&generator, &table)?;
        self.advance(RunPhase::Reported);
        output.phase = RunPhase::Reported;
        Ok(output)
    }

    fn advance(&mut self, next: RunPhase) {
        debug!(from = ?self.phase, to = ?next, "phase transition");
        self.phase = next;
    }

    fn sweep(
        &self,
        generator: &TaskGenerator,
        table: &LeagueTable,
        stats: &RuntimeStats,
        workers: usize,
    ) {
        let started = Instant::now();
        thread::scope(|s| {
            for worker in 0..workers {
                s.spawn(move || {
                    let mut simulated = 0u64;
                    while let Some(config) = generator.next_task() {
                        let t0 = Instant::now();
                        let result = self.simulator.simulate(&self.data, &config);
                        table.consider_result(&result);
                        stats.record(t0.elapsed());
                        simulated += 1;
                    }
                    debug!(worker, simulated, "worker finished");
                });
            }
        });
        info!(elapsed_s = started.elapsed().as_secs_f64(), "sweep joined");
    }

    /// Re-simulates every retained scenario and writes the CSV reports.
    fn write_reports(
        &self,
        generator: &TaskGenerator,
        table: &LeagueTable,
    ) -> Result<Vec<PathBuf>> {
        let dir = &self.config.output.directory;
        fs::create_dir_all(dir).map_err(|e| EpochError::io(dir, e))?;

        let mut cache: BTreeMap<u64, ScenarioRow> = BTreeMap::new();
        let mut row = |index: u64| -> Result<ScenarioRow> {
            if let Some(row) = cache.get(&index) {
                return Ok(row.clone());
            }
            let config = generator.get_task(index)?;
            let (result, _trace) = self.simulator.simulate_full(&self.data, &config);
            let row = (config, result);
            cache.insert(index, row.clone());
            Ok(row)
        };

        let mut files = Vec::with_capacity(Objective::ALL.len() + 1);
        for objective in Objective::ALL {
            let ranked = table.get_results_for_objective(objective);
            let rows = ranked
                .best
                .iter()
                .chain(ranked.worst.iter())
                .map(|e| row(e.index))
                .collect::<Result<Vec<_>>>()?;
            let path = dir.join(format!("{}.csv", objective.name()));
            export_results_csv(&rows, &path).map_err(|e| EpochError::io(&path, e))?;
            info!(%objective, rows = rows.len(), path = %path.display(), "wrote objective report");
            files.push(path);
        }

        let rows = table
            .get_all_results(false)
            .into_iter()
            .map(&mut row)
            .collect::<Result<Vec<_>>>()?;
        let path = dir.join(ALL_RESULTS_FILE);
        export_results_csv(&rows, &path).map_err(|e| EpochError::io(&path, e))?;
        info!(rows = rows.len(), path = %path.display(), "wrote combined report");
        files.push(path);

        Ok(files)
    }

    /// Rebuilds scenario `index` of `grid` from scratch, with its full trace.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid grid or
    /// [`EpochError::ScenarioIndex`] for an index outside the sweep.
    pub fn reproduce(&self, grid: &ParameterGrid, index: u64) -> Result<Reproduction> {
        let generator = TaskGenerator::new(grid, false)?;
        let config = generator.get_task(index)?;
        let (result, trace) = self.simulator.simulate_full(&self.data, &config);
        Ok(Reproduction {
            config,
            result,
            trace,
        })
    }

    /// [`Optimiser::reproduce`] against the grid of the most recent run.
    ///
    /// # Errors
    ///
    /// Returns [`EpochError::State`] if no sweep has been started yet.
    pub fn recall_index(&self, index: u64) -> Result<Reproduction> {
        let grid = self.last_grid.as_ref().ok_or_else(|| {
            EpochError::State("recall requires a prior optimisation or initialisation".into())
        })?;
        self.reproduce(grid, index)
    }
}
