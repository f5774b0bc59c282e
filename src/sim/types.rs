//! Simulation outputs: the ranked scalar result and the per-timestep trace.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use super::year_ts::YearTs;

/// A scenario reached a code path the model does not implement.
///
/// Non-fatal: the scenario still completes, carries degraded numbers and
/// remains eligible for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationDefect {
    /// A dispatch mode other than opportunistic was configured. The
    /// affected direction reports [`super::battery::UNSUPPORTED_MODE_SENTINEL`]
    /// at every timestep.
    UnsupportedDispatchMode { charge_mode: i64, discharge_mode: i64 },
}

impl fmt::Display for SimulationDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedDispatchMode {
                charge_mode,
                discharge_mode,
            } => write!(
                f,
                "unsupported dispatch mode (charge {charge_mode}, discharge {discharge_mode})"
            ),
        }
    }
}

/// Scalar outcome of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Scenario index (1-based) the result belongs to.
    pub index: u64,
    /// Total project capital expenditure.
    pub capex: f64,
    /// Annualised CAPEX plus annual operating cost.
    pub annualised_cost: f64,
    /// CAPEX / cost balance. Negative or infinite when the scenario saves nothing.
    pub payback_horizon: f64,
    /// Baseline minus scenario operating cost (positive = saving).
    pub cost_balance: f64,
    /// Baseline minus scenario direct (fuel) emissions, kgCO2e.
    pub carbon_balance_scope_1: f64,
    /// Baseline minus scenario grid-import emissions, kgCO2e.
    pub carbon_balance_scope_2: f64,
    pub baseline_opex: f64,
    pub scenario_opex: f64,
    /// Wall-clock time spent simulating. Excluded from [`SimulationResult::same_outcome`].
    #[serde(skip)]
    pub runtime: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defect: Option<SimulationDefect>,
}

impl SimulationResult {
    /// Ranked carbon objective: scope 1 plus scope 2.
    pub fn carbon_balance(&self) -> f64 {
        self.carbon_balance_scope_1 + self.carbon_balance_scope_2
    }

    /// Bit-identical comparison of every field except `runtime`.
    pub fn same_outcome(&self, other: &SimulationResult) -> bool {
        let bits = |r: &SimulationResult| {
            [
                r.capex,
                r.annualised_cost,
                r.payback_horizon,
                r.cost_balance,
                r.carbon_balance_scope_1,
                r.carbon_balance_scope_2,
                r.baseline_opex,
                r.scenario_opex,
            ]
            .map(f64::to_bits)
        };
        self.index == other.index && self.defect == other.defect && bits(self) == bits(other)
    }
}

/// Every intermediate series of one simulation, for per-timestep export.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScenarioTrace {
    pub load: YearTs,
    pub generation: YearTs,
    pub esum: YearTs,
    pub ess_charge: YearTs,
    pub ess_discharge: YearTs,
    /// Stored energy (kWh) at the end of each timestep.
    pub ess_soc: YearTs,
    pub pre_grid_balance: YearTs,
    pub grid_import: YearTs,
    pub grid_export: YearTs,
    /// Balance left after the grid: pre-grid balance less import plus export.
    pub post_grid_balance: YearTs,
    pub flex_shed: YearTs,
    pub import_shortfall: YearTs,
    pub mop_load: YearTs,
    pub curtailed_export: YearTs,
    pub heat_demand: YearTs,
    pub heat_yield: YearTs,
    pub heat_shortfall: YearTs,
    pub heat_surplus: YearTs,
}

impl ScenarioTrace {
    /// Named columns in export order.
    pub fn columns(&self) -> [(&'static str, &YearTs); 18] {
        [
            ("load_kw", &self.load),
            ("generation_kw", &self.generation),
            ("esum_kw", &self.esum),
            ("ess_charge_kw", &self.ess_charge),
            ("ess_discharge_kw", &self.ess_discharge),
            ("ess_soc_kwh", &self.ess_soc),
            ("pre_grid_balance_kw", &self.pre_grid_balance),
            ("grid_import_kw", &self.grid_import),
            ("grid_export_kw", &self.grid_export),
            ("post_grid_balance_kw", &self.post_grid_balance),
            ("flex_shed_kw", &self.flex_shed),
            ("import_shortfall_kw", &self.import_shortfall),
            ("mop_load_kw", &self.mop_load),
            ("curtailed_export_kw", &self.curtailed_export),
            ("heat_demand_kw", &self.heat_demand),
            ("heat_yield_kw", &self.heat_yield),
            ("heat_shortfall_kw", &self.heat_shortfall),
            ("heat_surplus_kw", &self.heat_surplus),
        ]
    }

    pub fn timesteps(&self) -> usize {
        self.load.len()
    }
}
