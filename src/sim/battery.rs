use crate::params::ScenarioConfig;
use crate::params::scenario::OPPORTUNISTIC_MODE;

use super::types::SimulationDefect;
use super::year_ts::YearTs;

/// Per-timestep value reported for a direction whose dispatch mode is not
/// implemented.
pub const UNSUPPORTED_MODE_SENTINEL: f64 = 999.9;

/// Outputs of one battery step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryStep {
    /// Charging power drawn this timestep (kW).
    pub charge: f64,
    /// Discharging power supplied this timestep (kW).
    pub discharge: f64,
}

/// Full-year battery dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryDispatch {
    pub charge: YearTs,
    pub discharge: YearTs,
    /// Stored energy (kWh) after each timestep.
    pub soc: YearTs,
}

/// A battery energy storage system dispatched against the net balance.
///
/// # Power Flow Convention
/// - Positive balance: site deficit, the battery may discharge
/// - Negative balance: site surplus, the battery may charge
#[derive(Debug, Clone)]
pub struct Battery {
    /// Usable capacity (kWh).
    pub capacity_kwh: f64,
    pub max_charge_kw: f64,
    pub max_discharge_kw: f64,
    /// Round-trip efficiency applied on the charge side.
    pub rte: f64,
    /// Stored energy at t = 0 (kWh).
    pub start_soc_kwh: f64,
    pub charge_mode: i64,
    pub discharge_mode: i64,
    dt_hours: f64,
}

impl Battery {
    pub fn from_config(config: &ScenarioConfig) -> Self {
        Self {
            capacity_kwh: config.ess_capacity,
            max_charge_kw: config.ess_charge_power,
            max_discharge_kw: config.ess_discharge_power,
            rte: config.ess_rte,
            start_soc_kwh: config.ess_start_soc * config.ess_capacity,
            charge_mode: config.ess_charge_mode,
            discharge_mode: config.ess_discharge_mode,
            dt_hours: config.timestep_hours,
        }
    }

    /// Set when either direction uses a mode other than opportunistic.
    pub fn defect(&self) -> Option<SimulationDefect> {
        if self.charge_mode == OPPORTUNISTIC_MODE && self.discharge_mode == OPPORTUNISTIC_MODE {
            None
        } else {
            Some(SimulationDefect::UnsupportedDispatchMode {
                charge_mode: self.charge_mode,
                discharge_mode: self.discharge_mode,
            })
        }
    }

    /// One step of the dispatch fold.
    ///
    /// Takes the stored energy after the previous step and this step's net
    /// balance, returns this step's flows and the new stored energy.
    pub fn step(&self, soc_prev: f64, balance: f64) -> (BatteryStep, f64) {
        let dt = self.dt_hours;
        let avail_discharge = (soc_prev / dt).min(self.max_discharge_kw).max(0.0);
        let avail_charge = ((self.capacity_kwh - soc_prev / dt) / self.rte)
            .min(self.max_charge_kw)
            .max(0.0);

        let charge = if self.charge_mode != OPPORTUNISTIC_MODE {
            UNSUPPORTED_MODE_SENTINEL
        } else if balance < 0.0 {
            (-balance).min(avail_charge)
        } else {
            0.0
        };
        let discharge = if self.discharge_mode != OPPORTUNISTIC_MODE {
            UNSUPPORTED_MODE_SENTINEL
        } else if balance > 0.0 {
            balance.min(avail_discharge)
        } else {
            0.0
        };

        let soc = soc_prev + dt * (charge * self.rte - discharge);
        (BatteryStep { charge, discharge }, soc)
    }

    /// Folds [`Battery::step`] over `balance` from t = 1. Timestep 0 holds
    /// the starting charge with no flow.
    pub fn dispatch(&self, balance: &YearTs) -> BatteryDispatch {
        let n = balance.len();
        let mut charge = YearTs::zeros(n);
        let mut discharge = YearTs::zeros(n);
        let mut soc = YearTs::zeros(n);
        if n == 0 {
            return BatteryDispatch {
                charge,
                discharge,
                soc,
            };
        }

        soc.set(0, self.start_soc_kwh);
        (1..n).fold(self.start_soc_kwh, |prev, t| {
            let (flows, next) = self.step(prev, balance[t]);
            charge.set(t, flows.charge);
            discharge.set(t, flows.discharge);
            soc.set(t, next);
            next
        });

        BatteryDispatch {
            charge,
            discharge,
            soc,
        }
    }
}
