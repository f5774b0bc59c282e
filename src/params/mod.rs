//! Parameter grid input and per-scenario configuration.

/// Parameter-grid JSON reader.
pub mod grid;
pub mod range;
/// Scenario configuration and the static parameter table.
pub mod scenario;

pub use grid::ParameterGrid;
pub use range::{ExpandedParameterRange, ParameterRange};
pub use scenario::{PARAMETERS, ParamKind, ParamSpec, ScenarioConfig};
