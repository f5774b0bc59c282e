//! Fixed simulation pipeline from site data and one scenario to its outcome.

use std::time::Instant;

use tracing::{trace, warn};

use crate::data::HistoricalData;
use crate::params::ScenarioConfig;

use super::battery::Battery;
use super::costs::{
    BOILER_EFFICIENCY, CapexModel, FUEL_CARBON_KG_PER_KWH, GRID_CARBON_KG_PER_KWH,
};
use super::grid::GridConnection;
use super::heat::heat_balance;
use super::types::{ScenarioTrace, SimulationResult};
use super::year_ts::YearTs;

/// Stateless scenario simulator.
///
/// Every call builds fresh scenario-local series, so one `Simulator` can be
/// shared by reference across worker threads.
///
/// # Examples
///
/// ```
/// use epoch::data::SyntheticSite;
/// use epoch::params::ScenarioConfig;
/// use epoch::sim::Simulator;
///
/// let data = SyntheticSite::new(24, 2, 1).generate().unwrap();
/// let result = Simulator::new().simulate(&data, &ScenarioConfig::default());
/// assert_eq!(result.capex, 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    capex: CapexModel,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scalar outcome only. Used by the sweep hot loop.
    pub fn simulate(&self, data: &HistoricalData, config: &ScenarioConfig) -> SimulationResult {
        self.run(data, config).0
    }

    /// Scalar outcome plus every intermediate series.
    ///
    /// The scalar result is bit-identical to [`Simulator::simulate`] apart
    /// from `runtime`.
    pub fn simulate_full(
        &self,
        data: &HistoricalData,
        config: &ScenarioConfig,
    ) -> (SimulationResult, ScenarioTrace) {
        self.run(data, config)
    }

    fn run(
        &self,
        data: &HistoricalData,
        config: &ScenarioConfig,
    ) -> (SimulationResult, ScenarioTrace) {
        let started = Instant::now();
        let n = data.timesteps();
        let dt = config.timestep_hours;

        // Load
        let mut fixed_load = YearTs::zeros(n);
        fixed_load.add_scaled(&data.electric_load_1, config.fixed_load1_scalar);
        fixed_load.add_scaled(&data.electric_load_2, config.fixed_load2_scalar);
        let mut load = fixed_load.clone();
        load.add_constant(config.ess_aux_load + config.flex_load_max);

        // Generation
        let scalars = [
            config.scalar_rg1,
            config.scalar_rg2,
            config.scalar_rg3,
            config.scalar_rg4,
        ];
        let mut generation = YearTs::zeros(n);
        for (series, scalar) in data.rgen.iter().zip(scalars) {
            generation.add_scaled(series, scalar);
        }

        let esum = load.sub(&generation);

        // Battery
        let battery = Battery::from_config(config);
        let defect = battery.defect();
        if let Some(defect) = defect {
            warn!(index = config.index, %defect, "scenario uses an unsupported dispatch mode");
        }
        let dispatch = battery.dispatch(&esum);
        let pre_grid_balance: YearTs = (0..n)
            .map(|t| esum[t] - dispatch.discharge[t] + dispatch.charge[t])
            .collect();

        // Grid
        let grid = GridConnection::from_config(config).exchange(&pre_grid_balance);
        let post_grid_balance: YearTs = (0..n)
            .map(|t| pre_grid_balance[t] - grid.import[t] + grid.export[t])
            .collect();

        // Heat
        let flex_and_mop: YearTs = (0..n)
            .map(|t| config.flex_load_max - grid.flex_shed[t] + grid.mop_load[t])
            .collect();
        let heat_demand = YearTs::from_vec(data.heat_load.clone()).scaled(config.scalar_hl1);
        let heat = heat_balance(
            heat_demand,
            &fixed_load,
            &flex_and_mop,
            config.scalar_hyield1,
            config.scalar_hyield2,
        );
        let heat_pump_kw = flex_and_mop.max() * config.scalar_hyield2;

        // Baseline: unscaled fixed loads from the grid, unscaled heat from the boiler.
        let baseline_import_kwh: f64 = data
            .electric_load_1
            .iter()
            .zip(&data.electric_load_2)
            .map(|(a, b)| (a + b) * dt)
            .sum();
        let baseline_import_cost: f64 = data
            .electric_load_1
            .iter()
            .zip(&data.electric_load_2)
            .zip(&data.import_tariff)
            .map(|((a, b), tariff)| (a + b) * tariff * dt)
            .sum();
        let baseline_fuel_kwh = data.heat_load.iter().map(|h| h * dt).sum::<f64>() / BOILER_EFFICIENCY;
        let baseline_opex = baseline_import_cost + baseline_fuel_kwh * config.fuel_kwh_price;

        // Scenario
        let import_kwh = grid.import.sum() * dt;
        let import_cost = grid.import.dot_energy(&data.import_tariff, dt);
        let fuel_kwh = heat.shortfall.sum() * dt / BOILER_EFFICIENCY;
        let shortfall_penalty = grid.import_shortfall.sum() * dt * config.shortfall_kwh_price;
        let export_revenue = grid.export.sum() * dt * config.export_kwh_price;
        let scenario_opex =
            import_cost + fuel_kwh * config.fuel_kwh_price + shortfall_penalty - export_revenue;

        let capex = self.capex.breakdown(config, heat_pump_kw);
        let capex_total = capex.total();
        let cost_balance = baseline_opex - scenario_opex;

        let result = SimulationResult {
            index: config.index,
            capex: capex_total,
            annualised_cost: capex.annualised() + scenario_opex,
            payback_horizon: capex_total / cost_balance,
            cost_balance,
            carbon_balance_scope_1: (baseline_fuel_kwh - fuel_kwh) * FUEL_CARBON_KG_PER_KWH,
            carbon_balance_scope_2: (baseline_import_kwh - import_kwh) * GRID_CARBON_KG_PER_KWH,
            baseline_opex,
            scenario_opex,
            runtime: started.elapsed(),
            defect,
        };
        trace!(index = config.index, cost_balance, "scenario simulated");

        let trace = ScenarioTrace {
            load,
            generation,
            esum,
            ess_charge: dispatch.charge,
            ess_discharge: dispatch.discharge,
            ess_soc: dispatch.soc,
            pre_grid_balance,
            grid_import: grid.import,
            grid_export: grid.export,
            post_grid_balance,
            flex_shed: grid.flex_shed,
            import_shortfall: grid.import_shortfall,
            mop_load: grid.mop_load,
            curtailed_export: grid.curtailed_export,
            heat_demand: heat.demand,
            heat_yield: heat.heat_yield,
            heat_shortfall: heat.shortfall,
            heat_surplus: heat.surplus,
        };
        (result, trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SyntheticSite;
    use crate::sim::battery::UNSUPPORTED_MODE_SENTINEL;

    fn site() -> HistoricalData {
        SyntheticSite::new(24, 7, 11).generate().expect("valid site")
    }

    fn flat_site(load: f64, tariff: f64) -> HistoricalData {
        HistoricalData::new(
            vec![load; 4],
            vec![0.0; 4],
            vec![0.0; 4],
            std::array::from_fn(|_| vec![0.0; 4]),
            vec![tariff; 4],
        )
        .expect("valid site")
    }

    #[test]
    fn test_default_scenario_matches_baseline() {
        let data = site();
        let config = ScenarioConfig {
            grid_import: 1e6,
            grid_existing: 1e6,
            ..ScenarioConfig::default()
        };
        let r = Simulator::new().simulate(&data, &config);
        assert_eq!(r.capex, 0.0);
        assert!(r.cost_balance.abs() < 1e-6);
        assert!(r.carbon_balance().abs() < 1e-6);
        assert!(r.defect.is_none());
    }

    #[test]
    fn test_cheap_and_full_agree() {
        let data = site();
        let config = ScenarioConfig {
            index: 7,
            ess_capacity: 200.0,
            ess_charge_power: 50.0,
            ess_discharge_power: 50.0,
            scalar_rg1: 80.0,
            flex_load_max: 10.0,
            scalar_hyield2: 2.5,
            ..ScenarioConfig::default()
        };
        let sim = Simulator::new();
        let cheap = sim.simulate(&data, &config);
        let (full, trace) = sim.simulate_full(&data, &config);
        assert!(cheap.same_outcome(&full));
        assert!(cheap.same_outcome(&sim.simulate(&data, &config)));
        assert_eq!(trace.timesteps(), data.timesteps());
        assert_eq!(full.index, 7);
    }

    #[test]
    fn test_import_cost_uses_timestep_duration() {
        let data = flat_site(10.0, 0.5);
        let config = ScenarioConfig {
            timestep_hours: 0.5,
            ..ScenarioConfig::default()
        };
        let r = Simulator::new().simulate(&data, &config);
        // 4 steps × 10 kW × 0.5 h × 0.5 per kWh
        assert!((r.scenario_opex - 10.0).abs() < 1e-12);
        assert!((r.baseline_opex - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_capped_import_is_penalised() {
        let data = flat_site(150.0, 0.2);
        let config = ScenarioConfig {
            grid_import: 100.0,
            ..ScenarioConfig::default()
        };
        let (r, trace) = Simulator::new().simulate_full(&data, &config);
        assert_eq!(trace.import_shortfall.as_slice(), &[50.0; 4]);
        let expected = 4.0 * (100.0 * 0.2 + 50.0 * config.shortfall_kwh_price);
        assert!((r.scenario_opex - expected).abs() < 1e-9);
        assert!(r.cost_balance < 0.0);
    }

    #[test]
    fn test_post_grid_balance_is_what_the_grid_could_not_carry() {
        let config = ScenarioConfig {
            grid_import: 100.0,
            flex_load_max: 20.0,
            ..ScenarioConfig::default()
        };
        // 130 kW fixed + 20 kW flexible against a 100 kW import cap.
        let (_, trace) = Simulator::new().simulate_full(&flat_site(130.0, 0.2), &config);
        assert_eq!(trace.post_grid_balance.as_slice(), &[50.0; 4]);
        assert_eq!(trace.flex_shed.as_slice(), &[20.0; 4]);
        assert_eq!(trace.import_shortfall.as_slice(), &[30.0; 4]);

        let (_, trace) = Simulator::new().simulate_full(&flat_site(10.0, 0.2), &config);
        assert_eq!(trace.post_grid_balance.as_slice(), &[0.0; 4]);
        let names: Vec<_> = trace.columns().iter().map(|(name, _)| *name).collect();
        assert!(names.contains(&"post_grid_balance_kw"));
    }

    #[test]
    fn test_no_saving_gives_unclamped_payback() {
        let data = flat_site(150.0, 0.2);
        let config = ScenarioConfig {
            grid_import: 100.0,
            s7_ev_cp_number: 1,
            ..ScenarioConfig::default()
        };
        let r = Simulator::new().simulate(&data, &config);
        assert!(r.payback_horizon < 0.0);
    }

    #[test]
    fn test_unsupported_mode_completes_with_defect() {
        let config = ScenarioConfig {
            ess_capacity: 100.0,
            ess_discharge_mode: 3,
            ..ScenarioConfig::default()
        };
        let (r, trace) = Simulator::new().simulate_full(&site(), &config);
        assert!(r.defect.is_some());
        assert_eq!(trace.ess_discharge[1], UNSUPPORTED_MODE_SENTINEL);
    }

    #[test]
    fn test_solar_surplus_is_exported() {
        let data = HistoricalData::new(
            vec![5.0; 2],
            vec![0.0; 2],
            vec![0.0; 2],
            [vec![1.0; 2], vec![0.0; 2], vec![0.0; 2], vec![0.0; 2]],
            vec![0.3; 2],
        )
        .expect("valid site");
        let config = ScenarioConfig {
            scalar_rg1: 25.0,
            ..ScenarioConfig::default()
        };
        let (r, trace) = Simulator::new().simulate_full(&data, &config);
        assert_eq!(trace.grid_export.as_slice(), &[20.0, 20.0]);
        assert_eq!(trace.grid_import.sum(), 0.0);
        assert!(r.cost_balance > 0.0);
        assert!(r.carbon_balance_scope_2 > 0.0);
    }
}
