//! Parameter-sweep optimiser for site energy systems.
//!
//! A [`params::ParameterGrid`] is expanded by a [`task_generator::TaskGenerator`]
//! into indexed scenarios, each simulated against shared
//! [`data::HistoricalData`] by the [`sim::Simulator`]. The
//! [`optimiser::Optimiser`] runs the sweep on a worker pool and keeps the best
//! scenarios per objective in a [`league_table::LeagueTable`].

pub mod config;
pub mod data;
pub mod error;
/// CSV export.
pub mod io;
pub mod league_table;
pub mod logging;
pub mod optimiser;
/// Parameter ranges, grids and the scenario parameter table.
pub mod params;
/// Simulation engine, battery, grid, heat and cost models.
pub mod sim;
pub mod task_generator;

pub use error::{EpochError, Result};
