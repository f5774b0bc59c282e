//! One concrete scenario and the closed table of named parameters.
//!
//! Every parameter that can appear in a grid is listed once in
//! [`PARAMETERS`] with a typed getter and setter. Names outside the table are
//! rejected when the grid is read, except [`IGNORED_KEY`].

use serde::Serialize;

/// Grid key carried by exported grids that is never a parameter.
pub const IGNORED_KEY: &str = "Parameter index";

/// Dispatch mode the battery model implements: charge only from surplus
/// generation, discharge only to cover the pre-grid shortfall.
pub const OPPORTUNISTIC_MODE: i64 = 1;

/// Storage type of a table parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParamKind {
    Float,
    Int,
}

/// Typed accessor pair for one named parameter.
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    get: fn(&ScenarioConfig) -> f64,
    set: fn(&mut ScenarioConfig, f64),
}

impl ParamSpec {
    pub fn get(&self, config: &ScenarioConfig) -> f64 {
        (self.get)(config)
    }

    /// Integer parameters round to the nearest whole number.
    pub fn set(&self, config: &mut ScenarioConfig, value: f64) {
        (self.set)(config, value)
    }
}

impl std::fmt::Debug for ParamSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Parameters for exactly one scenario, tagged with its 1-based index.
///
/// Built by the task generator from defaults plus the swept values; read
/// only by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioConfig {
    /// Position in the sweep (1-based). Zero for a hand-built config.
    pub index: u64,

    /// Timestep duration in hours (Δt).
    pub timestep_hours: f64,

    pub fixed_load1_scalar: f64,
    pub fixed_load2_scalar: f64,
    /// Flexible load target (kW); may be shed to cover a shortfall.
    pub flex_load_max: f64,
    /// Curtailable load cap (kW); absorbs surplus that cannot be exported.
    pub mop_load_max: f64,

    /// Installed kWp per normalised generation column.
    pub scalar_rg1: f64,
    pub scalar_rg2: f64,
    pub scalar_rg3: f64,
    pub scalar_rg4: f64,

    pub scalar_hl1: f64,
    /// Heat yield per kW of fixed load.
    pub scalar_hyield1: f64,
    /// Heat yield per kW of flexible and curtailable load.
    pub scalar_hyield2: f64,

    pub grid_import: f64,
    pub grid_export: f64,
    /// Connection capacity already in place; only the excess is CAPEX.
    pub grid_existing: f64,
    pub import_headroom: f64,
    pub export_headroom: f64,

    pub ess_charge_power: f64,
    pub ess_discharge_power: f64,
    pub ess_capacity: f64,
    pub ess_rte: f64,
    pub ess_aux_load: f64,
    pub ess_start_soc: f64,
    pub ess_charge_mode: i64,
    pub ess_discharge_mode: i64,

    pub export_kwh_price: f64,
    pub fuel_kwh_price: f64,
    /// Penalty per kWh of unserved demand.
    pub shortfall_kwh_price: f64,

    pub s7_ev_cp_number: i64,
    pub f22_ev_cp_number: i64,
    pub r50_ev_cp_number: i64,
    pub u150_ev_cp_number: i64,

    /// Parsed for schema compatibility; the sweep never enforces it.
    pub time_budget_min: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            index: 0,
            timestep_hours: 1.0,
            fixed_load1_scalar: 1.0,
            fixed_load2_scalar: 1.0,
            flex_load_max: 0.0,
            mop_load_max: 0.0,
            scalar_rg1: 0.0,
            scalar_rg2: 0.0,
            scalar_rg3: 0.0,
            scalar_rg4: 0.0,
            scalar_hl1: 1.0,
            scalar_hyield1: 0.0,
            scalar_hyield2: 0.0,
            grid_import: 100.0,
            grid_export: 100.0,
            grid_existing: 100.0,
            import_headroom: 0.0,
            export_headroom: 0.0,
            ess_charge_power: 0.0,
            ess_discharge_power: 0.0,
            ess_capacity: 0.0,
            ess_rte: 0.86,
            ess_aux_load: 0.0,
            ess_start_soc: 0.5,
            ess_charge_mode: OPPORTUNISTIC_MODE,
            ess_discharge_mode: OPPORTUNISTIC_MODE,
            export_kwh_price: 0.05,
            fuel_kwh_price: 0.07,
            shortfall_kwh_price: 5.0,
            s7_ev_cp_number: 0,
            f22_ev_cp_number: 0,
            r50_ev_cp_number: 0,
            u150_ev_cp_number: 0,
            time_budget_min: 0.0,
        }
    }
}

macro_rules! float_param {
    ($name:literal, $field:ident) => {
        ParamSpec {
            name: $name,
            kind: ParamKind::Float,
            get: |c| c.$field,
            set: |c, v| c.$field = v,
        }
    };
}

macro_rules! int_param {
    ($name:literal, $field:ident) => {
        ParamSpec {
            name: $name,
            kind: ParamKind::Int,
            get: |c| c.$field as f64,
            set: |c, v| c.$field = v.round() as i64,
        }
    };
}

/// Every grid-addressable parameter, in export column order.
pub static PARAMETERS: &[ParamSpec] = &[
    float_param!("timestep_hours", timestep_hours),
    float_param!("Fixed_load1_scalar", fixed_load1_scalar),
    float_param!("Fixed_load2_scalar", fixed_load2_scalar),
    float_param!("Flex_load_max", flex_load_max),
    float_param!("Mop_load_max", mop_load_max),
    float_param!("ScalarRG1", scalar_rg1),
    float_param!("ScalarRG2", scalar_rg2),
    float_param!("ScalarRG3", scalar_rg3),
    float_param!("ScalarRG4", scalar_rg4),
    float_param!("ScalarHL1", scalar_hl1),
    float_param!("ScalarHYield1", scalar_hyield1),
    float_param!("ScalarHYield2", scalar_hyield2),
    float_param!("GridImport", grid_import),
    float_param!("GridExport", grid_export),
    float_param!("GridExisting", grid_existing),
    float_param!("Import_headroom", import_headroom),
    float_param!("Export_headroom", export_headroom),
    float_param!("ESS_charge_power", ess_charge_power),
    float_param!("ESS_discharge_power", ess_discharge_power),
    float_param!("ESS_capacity", ess_capacity),
    float_param!("ESS_RTE", ess_rte),
    float_param!("ESS_aux_load", ess_aux_load),
    float_param!("ESS_start_SoC", ess_start_soc),
    int_param!("ESS_charge_mode", ess_charge_mode),
    int_param!("ESS_discharge_mode", ess_discharge_mode),
    float_param!("Export_kWh_price", export_kwh_price),
    float_param!("Fuel_kWh_price", fuel_kwh_price),
    float_param!("Shortfall_kWh_price", shortfall_kwh_price),
    int_param!("s7_EV_CP_number", s7_ev_cp_number),
    int_param!("f22_EV_CP_number", f22_ev_cp_number),
    int_param!("r50_EV_CP_number", r50_ev_cp_number),
    int_param!("u150_EV_CP_number", u150_ev_cp_number),
    float_param!("time_budget_min", time_budget_min),
];

/// Looks a parameter up by its grid name.
///
/// Float parameters are searched before integer ones.
pub fn lookup(name: &str) -> Option<&'static ParamSpec> {
    PARAMETERS
        .iter()
        .filter(|p| p.kind == ParamKind::Float)
        .chain(PARAMETERS.iter().filter(|p| p.kind == ParamKind::Int))
        .find(|p| p.name == name)
}

impl ScenarioConfig {
    /// Sets a parameter by grid name. Returns `false` for an unknown name.
    pub fn set_by_name(&mut self, name: &str, value: f64) -> bool {
        match lookup(name) {
            Some(param) => {
                param.set(self, value);
                true
            }
            None => false,
        }
    }

    /// All parameter values in [`PARAMETERS`] order.
    pub fn values(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        PARAMETERS.iter().map(move |p| (p.name, p.get(self)))
    }
}
