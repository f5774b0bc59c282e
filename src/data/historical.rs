//! Read-only annual input series shared by every scenario.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{EpochError, Result};

/// Number of renewable generation columns.
pub const RGEN_COLUMNS: usize = 4;

/// Equal-length site series, one value per timestep.
///
/// Loads and generation are average kW over the timestep; generation
/// columns are normalised per installed kWp. Constructed once and shared
/// by reference across all worker threads.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalData {
    pub electric_load_1: Vec<f64>,
    pub electric_load_2: Vec<f64>,
    pub heat_load: Vec<f64>,
    pub rgen: [Vec<f64>; RGEN_COLUMNS],
    /// Grid import tariff per kWh.
    pub import_tariff: Vec<f64>,
}

/// One row of the site CSV.
#[derive(Debug, Deserialize)]
struct HistoricalRow {
    electric_load_1: f64,
    electric_load_2: f64,
    heat_load: f64,
    rgen_1: f64,
    rgen_2: f64,
    rgen_3: f64,
    rgen_4: f64,
    import_tariff: f64,
}

impl HistoricalData {
    /// Bundles pre-parsed series.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the series are empty, of
    /// different lengths, or contain a NaN or infinite value.
    pub fn new(
        electric_load_1: Vec<f64>,
        electric_load_2: Vec<f64>,
        heat_load: Vec<f64>,
        rgen: [Vec<f64>; RGEN_COLUMNS],
        import_tariff: Vec<f64>,
    ) -> Result<Self> {
        let data = Self {
            electric_load_1,
            electric_load_2,
            heat_load,
            rgen,
            import_tariff,
        };
        data.validate()?;
        Ok(data)
    }

    fn validate(&self) -> Result<()> {
        let n = self.electric_load_1.len();
        if n == 0 {
            return Err(EpochError::config("historical data has no timesteps"));
        }
        for (name, series) in self.columns() {
            if series.len() != n {
                return Err(EpochError::config(format!(
                    "historical column \"{name}\" has {} values, expected {n}",
                    series.len()
                )));
            }
            if let Some(t) = series.iter().position(|v| !v.is_finite()) {
                return Err(EpochError::config(format!(
                    "historical column \"{name}\" has non-finite value at timestep {t}"
                )));
            }
        }
        Ok(())
    }

    fn columns(&self) -> [(&'static str, &[f64]); 8] {
        [
            ("electric_load_1", self.electric_load_1.as_slice()),
            ("electric_load_2", self.electric_load_2.as_slice()),
            ("heat_load", self.heat_load.as_slice()),
            ("rgen_1", self.rgen[0].as_slice()),
            ("rgen_2", self.rgen[1].as_slice()),
            ("rgen_3", self.rgen[2].as_slice()),
            ("rgen_4", self.rgen[3].as_slice()),
            ("import_tariff", self.import_tariff.as_slice()),
        ]
    }

    /// Number of timesteps in every series.
    pub fn timesteps(&self) -> usize {
        self.electric_load_1.len()
    }

    /// Loads a site CSV with a header row naming every column.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened, a CSV error for
    /// malformed rows, or a configuration error for an empty file or a
    /// non-finite value.
    pub fn from_csv_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| EpochError::io(path, e))?;
        let data = Self::from_csv_reader(file, path)?;
        info!(
            path = %path.display(),
            timesteps = data.timesteps(),
            "loaded historical data"
        );
        Ok(data)
    }

    /// Parses site CSV from any reader. `origin` labels errors.
    pub fn from_csv_reader(reader: impl Read, origin: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut data = Self {
            electric_load_1: Vec::new(),
            electric_load_2: Vec::new(),
            heat_load: Vec::new(),
            rgen: Default::default(),
            import_tariff: Vec::new(),
        };
        for row in rdr.deserialize::<HistoricalRow>() {
            let row = row.map_err(|e| EpochError::csv(origin, e))?;
            data.electric_load_1.push(row.electric_load_1);
            data.electric_load_2.push(row.electric_load_2);
            data.heat_load.push(row.heat_load);
            data.rgen[0].push(row.rgen_1);
            data.rgen[1].push(row.rgen_2);
            data.rgen[2].push(row.rgen_3);
            data.rgen[3].push(row.rgen_4);
            data.import_tariff.push(row.import_tariff);
        }
        data.validate()?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
electric_load_1,electric_load_2,heat_load,rgen_1,rgen_2,rgen_3,rgen_4,import_tariff
10.0,2.0,5.0,0.0,0.0,0.0,0.0,0.25
12.0,2.5,4.0,0.4,0.1,0.0,0.0,0.30
";

    #[test]
    fn parses_csv_rows_into_columns() {
        let data = HistoricalData::from_csv_reader(SAMPLE.as_bytes(), Path::new("sample.csv"))
            .expect("valid csv");
        assert_eq!(data.timesteps(), 2);
        assert_eq!(data.electric_load_1, vec![10.0, 12.0]);
        assert_eq!(data.rgen[0], vec![0.0, 0.4]);
        assert_eq!(data.import_tariff, vec![0.25, 0.30]);
    }

    #[test]
    fn empty_csv_is_rejected() {
        let header_only = SAMPLE.lines().next().expect("sample has a header");
        let err = HistoricalData::from_csv_reader(header_only.as_bytes(), Path::new("e.csv"));
        assert!(matches!(err, Err(EpochError::Configuration(_))));
    }

    #[test]
    fn malformed_row_reports_origin() {
        let bad = format!("{SAMPLE}1.0,2.0\n");
        let err = HistoricalData::from_csv_reader(bad.as_bytes(), Path::new("bad.csv"))
            .unwrap_err();
        assert!(err.to_string().contains("bad.csv"));
    }

    #[test]
    fn ragged_series_are_rejected() {
        let err = HistoricalData::new(
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![1.0],
            std::array::from_fn(|_| vec![0.0, 0.0]),
            vec![0.1, 0.1],
        );
        let msg = err.expect_err("ragged heat load").to_string();
        assert!(msg.contains("heat_load"));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let err = HistoricalData::new(
            vec![f64::NAN; 4],
            vec![0.0; 4],
            vec![0.0; 4],
            std::array::from_fn(|_| vec![0.0; 4]),
            vec![0.25; 4],
        );
        assert!(matches!(err, Err(EpochError::Configuration(_))));

        let inf_row = format!("{SAMPLE}1.0,2.0,3.0,0.0,0.0,0.0,inf,0.2\n");
        let err = HistoricalData::from_csv_reader(inf_row.as_bytes(), Path::new("inf.csv"))
            .expect_err("infinite generation");
        assert!(err.to_string().contains("rgen_4"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = HistoricalData::from_csv_file(Path::new("/nonexistent/site.csv"));
        assert!(matches!(err, Err(EpochError::Io { .. })));
    }
}
