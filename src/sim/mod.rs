//! Per-scenario simulation: load, generation, storage, grid, heat and costs.

/// Battery dispatch as a fold over the net balance.
pub mod battery;
pub mod costs;
pub mod engine;
/// Grid exchange with headroom, load shedding and curtailment.
pub mod grid;
pub mod heat;
pub mod types;
pub mod year_ts;

pub use engine::Simulator;
pub use types::{ScenarioTrace, SimulationDefect, SimulationResult};
pub use year_ts::YearTs;
