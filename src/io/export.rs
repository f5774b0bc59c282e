//! CSV export for ranked scenarios and per-timestep traces.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::params::{PARAMETERS, ScenarioConfig};
use crate::sim::{ScenarioTrace, SimulationResult};

/// Scalar columns written before the parameter columns.
const RESULT_HEADER: &str = "index,capex,annualised_cost,payback_horizon,cost_balance,\
                             carbon_balance,carbon_balance_scope_1,carbon_balance_scope_2,\
                             baseline_opex,scenario_opex,defect";

/// A reproduced scenario: its parameters and outcome.
pub type ScenarioRow = (ScenarioConfig, SimulationResult);

/// Exports scenario rows to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_results_csv(rows: &[ScenarioRow], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_results_csv(rows, io::BufWriter::new(file))
}

/// Writes one row per scenario: financial and carbon scalars, then every
/// table parameter in table order.
pub fn write_results_csv(rows: &[ScenarioRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let header = RESULT_HEADER
        .split(',')
        .map(str::trim)
        .chain(PARAMETERS.iter().map(|p| p.name));
    wtr.write_record(header)?;

    for (config, r) in rows {
        let mut record = vec![
            r.index.to_string(),
            r.capex.to_string(),
            r.annualised_cost.to_string(),
            r.payback_horizon.to_string(),
            r.cost_balance.to_string(),
            r.carbon_balance().to_string(),
            r.carbon_balance_scope_1.to_string(),
            r.carbon_balance_scope_2.to_string(),
            r.baseline_opex.to_string(),
            r.scenario_opex.to_string(),
            r.defect.map(|d| d.to_string()).unwrap_or_default(),
        ];
        record.extend(config.values().map(|(_, v)| v.to_string()));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports a per-timestep trace to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_trace_csv(trace: &ScenarioTrace, dt_hours: f64, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_trace_csv(trace, dt_hours, io::BufWriter::new(file))
}

pub fn write_trace_csv(trace: &ScenarioTrace, dt_hours: f64, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    let columns = trace.columns();

    let header = ["timestep", "time_hr"]
        .into_iter()
        .chain(columns.iter().map(|(name, _)| *name));
    wtr.write_record(header)?;

    for t in 0..trace.timesteps() {
        let mut record = vec![t.to_string(), format!("{:.2}", t as f64 * dt_hours)];
        record.extend(columns.iter().map(|(_, series)| format!("{:.4}", series[t])));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimulationDefect, YearTs};
    use std::time::Duration;

    fn row(index: u64) -> ScenarioRow {
        let config = ScenarioConfig {
            index,
            ess_capacity: 100.0 * index as f64,
            ..ScenarioConfig::default()
        };
        let result = SimulationResult {
            index,
            capex: 1000.0,
            annualised_cost: 250.5,
            payback_horizon: 4.0,
            cost_balance: 250.0,
            carbon_balance_scope_1: 1.5,
            carbon_balance_scope_2: 2.0,
            baseline_opex: 900.0,
            scenario_opex: 650.0,
            runtime: Duration::ZERO,
            defect: None,
        };
        (config, result)
    }

    fn render(rows: &[ScenarioRow]) -> String {
        let mut buf = Vec::new();
        write_results_csv(rows, &mut buf).expect("write to memory");
        String::from_utf8(buf).expect("utf-8 csv")
    }

    #[test]
    fn header_lists_scalars_then_parameters() {
        let output = render(&[row(1)]);
        let header: Vec<&str> = output.lines().next().expect("header").split(',').collect();
        assert_eq!(header[0], "index");
        assert_eq!(header[10], "defect");
        assert_eq!(header.len(), 11 + PARAMETERS.len());
        assert_eq!(header[11], PARAMETERS[0].name);
    }

    #[test]
    fn rows_carry_parameter_values() {
        let output = render(&[row(1), row(2)]);
        let mut rdr = csv::Reader::from_reader(output.as_bytes());
        let headers = rdr.headers().expect("header row").clone();
        let col = headers
            .iter()
            .position(|h| h == "ESS_capacity")
            .expect("ESS_capacity column");
        let values: Vec<String> = rdr
            .records()
            .map(|r| r.expect("valid record")[col].to_string())
            .collect();
        assert_eq!(values, vec!["100", "200"]);
    }

    #[test]
    fn defect_is_written_as_text() {
        let (config, mut result) = row(3);
        result.defect = Some(SimulationDefect::UnsupportedDispatchMode {
            charge_mode: 2,
            discharge_mode: 1,
        });
        let output = render(&[(config, result)]);
        assert!(output.contains("unsupported dispatch mode"));
    }

    fn ramp_trace(n: usize) -> ScenarioTrace {
        let ramp = || YearTs::from_vec((1..=n).map(|v| v as f64).collect());
        ScenarioTrace {
            load: ramp(),
            generation: ramp(),
            esum: ramp(),
            ess_charge: ramp(),
            ess_discharge: ramp(),
            ess_soc: ramp(),
            pre_grid_balance: ramp(),
            grid_import: ramp(),
            grid_export: ramp(),
            post_grid_balance: ramp(),
            flex_shed: ramp(),
            import_shortfall: ramp(),
            mop_load: ramp(),
            curtailed_export: ramp(),
            heat_demand: ramp(),
            heat_yield: ramp(),
            heat_shortfall: ramp(),
            heat_surplus: ramp(),
        }
    }

    #[test]
    fn trace_has_one_row_per_timestep() {
        let mut buf = Vec::new();
        write_trace_csv(&ramp_trace(3), 0.5, &mut buf).expect("write to memory");
        let output = String::from_utf8(buf).expect("utf-8 csv");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("timestep,time_hr,load_kw"));
        assert!(lines[3].starts_with("2,1.00,3.0000"));
    }
}
