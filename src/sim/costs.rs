//! Capital cost curves and the fixed financial and carbon constants.

use crate::error::{EpochError, Result};
use crate::params::ScenarioConfig;

/// Boiler thermal efficiency used for both baseline and scenario heat.
pub const BOILER_EFFICIENCY: f64 = 0.9;
/// Grid electricity emission factor (kgCO2e per kWh imported).
pub const GRID_CARBON_KG_PER_KWH: f64 = 0.207;
/// Boiler fuel emission factor (kgCO2e per kWh of fuel burned).
pub const FUEL_CARBON_KG_PER_KWH: f64 = 0.183;

/// Asset lifetimes (years) used to annualise CAPEX.
pub const ESS_LIFETIME_YEARS: f64 = 15.0;
pub const PV_LIFETIME_YEARS: f64 = 25.0;
pub const EV_LIFETIME_YEARS: f64 = 15.0;
pub const GRID_LIFETIME_YEARS: f64 = 25.0;
pub const HEAT_PUMP_LIFETIME_YEARS: f64 = 10.0;

/// Maps a sized capacity to an installed cost.
pub trait CapexCurve {
    fn cost(&self, size: f64) -> f64;
}

/// Tiered unit-cost curve.
///
/// Band `i` spans `[thresholds[i-1], thresholds[i])` and every unit inside
/// it costs `unit_costs[i]`; the last band is open-ended. Costs accumulate
/// across bands, so the curve is continuous and `cost(0) == 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    thresholds: Vec<f64>,
    unit_costs: Vec<f64>,
}

impl PiecewiseLinear {
    /// # Errors
    ///
    /// Returns a configuration error unless there is exactly one more unit
    /// cost than thresholds and thresholds are positive and increasing.
    pub fn new(thresholds: Vec<f64>, unit_costs: Vec<f64>) -> Result<Self> {
        if unit_costs.len() != thresholds.len() + 1 {
            return Err(EpochError::config(format!(
                "cost curve needs {} unit costs for {} thresholds, got {}",
                thresholds.len() + 1,
                thresholds.len(),
                unit_costs.len()
            )));
        }
        let mut prev = 0.0;
        for &t in &thresholds {
            if t.is_nan() || t <= prev {
                return Err(EpochError::config(
                    "cost curve thresholds must be positive and strictly increasing",
                ));
            }
            prev = t;
        }
        Ok(Self::tiered(&thresholds, &unit_costs))
    }

    fn tiered(thresholds: &[f64], unit_costs: &[f64]) -> Self {
        Self {
            thresholds: thresholds.to_vec(),
            unit_costs: unit_costs.to_vec(),
        }
    }
}

impl CapexCurve for PiecewiseLinear {
    fn cost(&self, size: f64) -> f64 {
        if size <= 0.0 {
            return 0.0;
        }
        let mut total = 0.0;
        let mut lower = 0.0;
        for (i, &unit) in self.unit_costs.iter().enumerate() {
            let upper = self.thresholds.get(i).copied().unwrap_or(f64::INFINITY);
            if size <= lower {
                break;
            }
            total += (size.min(upper) - lower) * unit;
            lower = upper;
        }
        total
    }
}

/// Installed cost per component.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CapexBreakdown {
    pub ess: f64,
    pub pv: f64,
    pub ev: f64,
    pub grid: f64,
    pub heat_pump: f64,
}

impl CapexBreakdown {
    pub fn total(&self) -> f64 {
        self.ess + self.pv + self.ev + self.grid + self.heat_pump
    }

    /// Σ component cost / component lifetime.
    pub fn annualised(&self) -> f64 {
        self.ess / ESS_LIFETIME_YEARS
            + self.pv / PV_LIFETIME_YEARS
            + self.ev / EV_LIFETIME_YEARS
            + self.grid / GRID_LIFETIME_YEARS
            + self.heat_pump / HEAT_PUMP_LIFETIME_YEARS
    }
}

/// The full set of cost curves.
#[derive(Debug, Clone)]
pub struct CapexModel {
    /// Battery enclosure, by kWh.
    pub ess_enclosure: PiecewiseLinear,
    /// Battery power conversion, by kW.
    pub ess_pcs: PiecewiseLinear,
    /// Solar, by kWp.
    pub pv: PiecewiseLinear,
    /// Connection upgrade, by kW above the existing connection.
    pub grid: PiecewiseLinear,
    /// Heat pump, by peak heat output kW.
    pub heat_pump: PiecewiseLinear,
    /// Unit cost per chargepoint: 7 kW, 22 kW, 50 kW rapid, 150 kW ultra.
    pub ev_unit_costs: [f64; 4],
}

impl Default for CapexModel {
    fn default() -> Self {
        Self {
            ess_enclosure: PiecewiseLinear::tiered(&[100.0, 1000.0], &[480.0, 360.0, 240.0]),
            ess_pcs: PiecewiseLinear::tiered(&[50.0, 1000.0], &[250.0, 125.0, 75.0]),
            pv: PiecewiseLinear::tiered(&[50.0, 1000.0], &[1150.0, 950.0, 850.0]),
            grid: PiecewiseLinear::tiered(&[50.0, 1000.0], &[240.0, 160.0, 120.0]),
            heat_pump: PiecewiseLinear::tiered(&[15.0, 100.0], &[1000.0, 800.0, 600.0]),
            ev_unit_costs: [1200.0, 3000.0, 25000.0, 80000.0],
        }
    }
}

impl CapexModel {
    /// Costs every sized component of `config`. `heat_pump_kw` is the peak
    /// heat output the scenario asked of its flexible loads.
    pub fn breakdown(&self, config: &ScenarioConfig, heat_pump_kw: f64) -> CapexBreakdown {
        let pcs_kw = config.ess_charge_power.max(config.ess_discharge_power);
        let ess = if config.ess_capacity > 0.0 {
            self.ess_enclosure.cost(config.ess_capacity) + self.ess_pcs.cost(pcs_kw)
        } else {
            0.0
        };

        let pv_kwp = config.scalar_rg1 + config.scalar_rg2 + config.scalar_rg3 + config.scalar_rg4;

        let counts = [
            config.s7_ev_cp_number,
            config.f22_ev_cp_number,
            config.r50_ev_cp_number,
            config.u150_ev_cp_number,
        ];
        let ev = counts
            .iter()
            .zip(self.ev_unit_costs)
            .map(|(&n, unit)| n.max(0) as f64 * unit)
            .sum();

        CapexBreakdown {
            ess,
            pv: self.pv.cost(pv_kwp),
            ev,
            grid: self.grid.cost(config.grid_import - config.grid_existing),
            heat_pump: self.heat_pump.cost(heat_pump_kw),
        }
    }
}
