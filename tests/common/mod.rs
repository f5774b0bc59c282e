//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use epoch::config::EngineConfig;
use epoch::data::{HistoricalData, SyntheticSite};
use epoch::params::ScenarioConfig;

/// One synthetic hourly week (seed 42).
pub fn week_site() -> HistoricalData {
    SyntheticSite::new(24, 7, 42)
        .generate()
        .expect("synthetic site should be valid")
}

/// Constant load with no generation or heat.
pub fn constant_load_site(load_kw: f64, timesteps: usize) -> HistoricalData {
    HistoricalData::new(
        vec![load_kw; timesteps],
        vec![0.0; timesteps],
        vec![0.0; timesteps],
        std::array::from_fn(|_| vec![0.0; timesteps]),
        vec![0.25; timesteps],
    )
    .expect("constant site should be valid")
}

/// 900 kWh battery, 300 kW both ways, RTE 0.86, starting half full.
pub fn reference_battery() -> ScenarioConfig {
    ScenarioConfig {
        ess_capacity: 900.0,
        ess_charge_power: 300.0,
        ess_discharge_power: 300.0,
        ess_rte: 0.86,
        ess_start_soc: 0.5,
        grid_import: 1000.0,
        grid_existing: 1000.0,
        ..ScenarioConfig::default()
    }
}

/// Engine configuration writing into `dir`.
pub fn engine_config(dir: &Path, capacity: usize) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.optimiser.leaderboard_capacity = capacity;
    config.optimiser.max_concurrency = 4;
    config.output.directory = dir.to_path_buf();
    config
}

/// Path of the demo grid shipped with the crate.
pub fn demo_grid_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("grids/demo.json")
}

/// Writes `json` to `dir/grid.json` and returns its path.
pub fn write_grid(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("grid.json");
    fs::write(&path, json).expect("grid file should be writable");
    path
}

/// Reads a CSV export into (header, rows).
pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut rdr = csv::Reader::from_path(path).expect("csv should open");
    let header = rdr
        .headers()
        .expect("csv should have a header")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = rdr
        .records()
        .map(|r| r.expect("row should parse").iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}
