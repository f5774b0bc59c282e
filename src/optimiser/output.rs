use std::path::PathBuf;

use serde::Serialize;

use super::RunPhase;
use super::runtime::RuntimeSummary;
use crate::league_table::{LeagueTable, Objective};

/// Flat summary of one sweep, serialised as the run's JSON report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimisationOutput {
    pub phase: RunPhase,
    pub initialisation_only: bool,
    /// Size of the full parameter sweep.
    pub total_scenarios: u64,
    /// Scenarios actually simulated.
    pub simulated: u64,
    pub workers: usize,

    pub capex: Option<f64>,
    pub capex_index: Option<u64>,
    pub annualised_cost: Option<f64>,
    pub annualised_cost_index: Option<u64>,
    pub payback_horizon: Option<f64>,
    pub payback_horizon_index: Option<u64>,
    pub cost_balance: Option<f64>,
    pub cost_balance_index: Option<u64>,
    pub carbon_balance: Option<f64>,
    pub carbon_balance_index: Option<u64>,

    pub runtime_min_s: f64,
    pub runtime_max_s: f64,
    pub runtime_mean_s: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub est_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub est_hours: Option<f64>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,
}

impl OptimisationOutput {
    pub(crate) fn from_table(
        table: &LeagueTable,
        runtime: &RuntimeSummary,
        total_scenarios: u64,
        workers: usize,
        initialisation_only: bool,
    ) -> Self {
        let best = |o: Objective| table.best(o);
        let capex = best(Objective::Capex);
        let annualised = best(Objective::AnnualisedCost);
        let payback = best(Objective::PaybackHorizon);
        let cost = best(Objective::CostBalance);
        let carbon = best(Objective::CarbonBalance);

        let estimate =
            initialisation_only.then(|| runtime.estimate_total(total_scenarios, workers).as_secs_f64());

        Self {
            phase: RunPhase::Joined,
            initialisation_only,
            total_scenarios,
            simulated: runtime.count,
            workers,
            capex: capex.map(|e| e.value),
            capex_index: capex.map(|e| e.index),
            annualised_cost: annualised.map(|e| e.value),
            annualised_cost_index: annualised.map(|e| e.index),
            payback_horizon: payback.map(|e| e.value),
            payback_horizon_index: payback.map(|e| e.index),
            cost_balance: cost.map(|e| e.value),
            cost_balance_index: cost.map(|e| e.index),
            carbon_balance: carbon.map(|e| e.value),
            carbon_balance_index: carbon.map(|e| e.index),
            runtime_min_s: runtime.min.as_secs_f64(),
            runtime_max_s: runtime.max.as_secs_f64(),
            runtime_mean_s: runtime.mean.as_secs_f64(),
            est_seconds: estimate,
            est_hours: estimate.map(|s| s / 3600.0),
            files: Vec::new(),
        }
    }

    /// Best (value, index) for one objective.
    pub fn best(&self, objective: Objective) -> Option<(f64, u64)> {
        let (value, index) = match objective {
            Objective::Capex => (self.capex, self.capex_index),
            Objective::AnnualisedCost => (self.annualised_cost, self.annualised_cost_index),
            Objective::PaybackHorizon => (self.payback_horizon, self.payback_horizon_index),
            Objective::CostBalance => (self.cost_balance, self.cost_balance_index),
            Objective::CarbonBalance => (self.carbon_balance, self.carbon_balance_index),
        };
        value.zip(index)
    }
}
