//! Parameter-grid JSON reader.
//!
//! The grid is one JSON object keyed by parameter name. A three-element
//! array `[min, max, step]` is a swept range; a bare number is a fixed value.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use super::range::ParameterRange;
use super::scenario::{self, IGNORED_KEY};
use crate::error::{EpochError, Result};

/// Ranges in the order they appear in the source object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterGrid {
    pub ranges: Vec<ParameterRange>,
}

impl ParameterGrid {
    pub fn new(ranges: Vec<ParameterRange>) -> Self {
        Self { ranges }
    }

    /// Reads a grid from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file is unreadable, otherwise see
    /// [`ParameterGrid::from_json_str`].
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| EpochError::io(path, e))?;
        Self::from_json_str(&raw)
    }

    /// Parses a grid from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the top level is not an object, a
    /// value is neither a number nor a three-number array, or a key names
    /// no known parameter.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        match value {
            Value::Object(map) => Self::from_json_map(&map),
            _ => Err(EpochError::config("parameter grid must be a JSON object")),
        }
    }

    fn from_json_map(map: &Map<String, Value>) -> Result<Self> {
        let mut ranges = Vec::with_capacity(map.len());
        for (key, value) in map {
            if key == IGNORED_KEY {
                continue;
            }
            if scenario::lookup(key).is_none() {
                return Err(EpochError::config(format!(
                    "at `$.{key}`: unknown parameter"
                )));
            }
            ranges.push(parse_entry(key, value)?);
        }
        debug!(parameters = ranges.len(), "parsed parameter grid");
        Ok(Self { ranges })
    }
}

fn parse_entry(key: &str, value: &Value) -> Result<ParameterRange> {
    match value {
        Value::Number(n) => {
            let v = as_f64(key, n)?;
            Ok(ParameterRange::fixed(key, v))
        }
        Value::Array(items) if items.len() == 3 => {
            let mut bounds = [0.0; 3];
            for (slot, item) in bounds.iter_mut().zip(items) {
                *slot = match item {
                    Value::Number(n) => as_f64(key, n)?,
                    _ => {
                        return Err(EpochError::config(format!(
                            "at `$.{key}`: range entries must be numbers"
                        )));
                    }
                };
            }
            let [min, max, step] = bounds;
            Ok(ParameterRange::new(key, min, max, step))
        }
        _ => Err(EpochError::config(format!(
            "at `$.{key}`: expected a number or a [min, max, step] array"
        ))),
    }
}

fn as_f64(key: &str, n: &serde_json::Number) -> Result<f64> {
    n.as_f64()
        .ok_or_else(|| EpochError::config(format!("at `$.{key}`: number out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ranges_and_scalars_in_source_order() {
        let grid = ParameterGrid::from_json_str(
            r#"{"ESS_capacity": [800, 900, 20], "GridImport": 140, "ESS_RTE": [0.8, 0.9, 0.05]}"#,
        )
        .expect("valid grid");
        let names: Vec<_> = grid.ranges.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ESS_capacity", "GridImport", "ESS_RTE"]);
        assert_eq!(grid.ranges[0], ParameterRange::new("ESS_capacity", 800.0, 900.0, 20.0));
        assert_eq!(grid.ranges[1], ParameterRange::fixed("GridImport", 140.0));
    }

    #[test]
    fn parameter_index_key_is_ignored() {
        let grid = ParameterGrid::from_json_str(r#"{"Parameter index": 17, "ESS_capacity": 100}"#)
            .expect("valid grid");
        assert_eq!(grid.ranges.len(), 1);
    }

    #[test]
    fn unknown_key_reports_path() {
        let err = ParameterGrid::from_json_str(r#"{"bad_key": 1}"#).unwrap_err();
        assert!(err.to_string().contains("$.bad_key"));
    }

    #[test]
    fn int_parameters_are_accepted() {
        let grid = ParameterGrid::from_json_str(r#"{"f22_EV_CP_number": [0, 4, 2]}"#)
            .expect("valid grid");
        assert_eq!(grid.ranges[0].max, 4.0);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(ParameterGrid::from_json_str(r#"{"ESS_capacity": [1, 2]}"#).is_err());
        assert!(ParameterGrid::from_json_str(r#"{"ESS_capacity": "big"}"#).is_err());
        assert!(ParameterGrid::from_json_str(r#"{"ESS_capacity": [1, "2", 1]}"#).is_err());
        assert!(ParameterGrid::from_json_str("[1, 2, 3]").is_err());
        assert!(ParameterGrid::from_json_str("{not json").is_err());
    }
}
