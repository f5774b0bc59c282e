use crate::params::ScenarioConfig;

use super::year_ts::YearTs;

/// Flows at the point of connection for one timestep (all kW, non-negative).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridStep {
    pub import: f64,
    pub export: f64,
    /// Flexible load dropped because import was capped.
    pub flex_shed: f64,
    /// Demand left unserved after shedding.
    pub import_shortfall: f64,
    /// Curtailable load switched on to absorb surplus.
    pub mop_load: f64,
    /// Surplus neither exported nor absorbed.
    pub curtailed_export: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridExchange {
    pub import: YearTs,
    pub export: YearTs,
    pub flex_shed: YearTs,
    pub import_shortfall: YearTs,
    pub mop_load: YearTs,
    pub curtailed_export: YearTs,
}

/// Site grid connection with headroom-reduced import and export limits.
///
/// Net balance convention matches the rest of the pipeline: positive means
/// the site needs power, negative means it has surplus.
#[derive(Debug, Clone)]
pub struct GridConnection {
    max_import_kw: f64,
    max_export_kw: f64,
    flex_load_max: f64,
    mop_load_max: f64,
}

impl GridConnection {
    pub fn from_config(config: &ScenarioConfig) -> Self {
        Self {
            max_import_kw: (config.grid_import * (1.0 - config.import_headroom)).max(0.0),
            max_export_kw: (config.grid_export * (1.0 - config.export_headroom)).max(0.0),
            flex_load_max: config.flex_load_max.max(0.0),
            mop_load_max: config.mop_load_max.max(0.0),
        }
    }

    pub fn max_import_kw(&self) -> f64 {
        self.max_import_kw
    }

    pub fn max_export_kw(&self) -> f64 {
        self.max_export_kw
    }

    pub fn step(&self, balance: f64) -> GridStep {
        if balance > 0.0 {
            let import = balance.min(self.max_import_kw);
            let residual = balance - import;
            let flex_shed = residual.min(self.flex_load_max);
            GridStep {
                import,
                flex_shed,
                import_shortfall: residual - flex_shed,
                ..GridStep::default()
            }
        } else if balance < 0.0 {
            let export = (-balance).min(self.max_export_kw);
            let residual = -balance - export;
            let mop_load = residual.min(self.mop_load_max);
            GridStep {
                export,
                mop_load,
                curtailed_export: residual - mop_load,
                ..GridStep::default()
            }
        } else {
            GridStep::default()
        }
    }

    pub fn exchange(&self, pre_grid_balance: &YearTs) -> GridExchange {
        let n = pre_grid_balance.len();
        let mut out = GridExchange {
            import: YearTs::zeros(n),
            export: YearTs::zeros(n),
            flex_shed: YearTs::zeros(n),
            import_shortfall: YearTs::zeros(n),
            mop_load: YearTs::zeros(n),
            curtailed_export: YearTs::zeros(n),
        };
        for (t, balance) in pre_grid_balance.iter().enumerate() {
            let s = self.step(balance);
            out.import.set(t, s.import);
            out.export.set(t, s.export);
            out.flex_shed.set(t, s.flex_shed);
            out.import_shortfall.set(t, s.import_shortfall);
            out.mop_load.set(t, s.mop_load);
            out.curtailed_export.set(t, s.curtailed_export);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> GridConnection {
        let config = ScenarioConfig {
            grid_import: 100.0,
            grid_export: 50.0,
            import_headroom: 0.1,
            export_headroom: 0.0,
            flex_load_max: 20.0,
            mop_load_max: 5.0,
            ..ScenarioConfig::default()
        };
        GridConnection::from_config(&config)
    }

    #[test]
    fn test_headroom_reduces_limits() {
        let g = connection();
        assert!((g.max_import_kw() - 90.0).abs() < 1e-12);
        assert_eq!(g.max_export_kw(), 50.0);
    }

    #[test]
    fn test_deficit_within_limit_is_imported() {
        let s = connection().step(40.0);
        assert_eq!(s.import, 40.0);
        assert_eq!(s.flex_shed + s.import_shortfall, 0.0);
    }

    #[test]
    fn test_excess_deficit_sheds_flex_then_falls_short() {
        let s = connection().step(100.0);
        assert!((s.import - 90.0).abs() < 1e-12);
        assert!((s.flex_shed - 10.0).abs() < 1e-12);
        assert_eq!(s.import_shortfall, 0.0);

        let s = connection().step(150.0);
        assert_eq!(s.flex_shed, 20.0);
        assert!((s.import_shortfall - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_excess_surplus_runs_mop_then_curtails() {
        let s = connection().step(-80.0);
        assert_eq!(s.export, 50.0);
        assert_eq!(s.mop_load, 5.0);
        assert_eq!(s.curtailed_export, 25.0);
    }

    #[test]
    fn test_exchange_conserves_balance() {
        let g = connection();
        let balance = YearTs::from_vec(vec![150.0, -80.0, 0.0, 10.0]);
        let x = g.exchange(&balance);
        for t in 0..balance.len() {
            let served = x.import[t] + x.flex_shed[t] + x.import_shortfall[t]
                - x.export[t]
                - x.mop_load[t]
                - x.curtailed_export[t];
            assert!((served - balance[t]).abs() < 1e-9);
        }
    }
}
