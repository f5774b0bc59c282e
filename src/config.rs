//! TOML-based engine configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::EpochError;

/// Top-level engine configuration parsed from TOML.
///
/// Every field has a default, so an empty file is valid. Load from TOML
/// with [`EngineConfig::from_toml_file`] or use [`EngineConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Worker pool and ranking parameters.
    #[serde(default)]
    pub optimiser: OptimiserConfig,
    /// Where reports are written.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Worker pool and ranking parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimiserConfig {
    /// Number of best scenarios retained per objective (must be > 0).
    pub leaderboard_capacity: usize,
    /// Upper bound on worker threads (must be > 0).
    pub max_concurrency: usize,
}

impl Default for OptimiserConfig {
    fn default() -> Self {
        Self {
            leaderboard_capacity: 10,
            max_concurrency: 8,
        }
    }
}

/// Report output location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory receiving CSV exports.
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("results"),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"optimiser.max_concurrency"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} ({})", self.field, self.message)
    }
}

impl From<ConfigError> for EpochError {
    fn from(e: ConfigError) -> Self {
        EpochError::Configuration(format!("{}: {}", e.field, e.message))
    }
}

impl EngineConfig {
    /// Runs every scenario on one worker thread.
    pub fn single_thread() -> Self {
        Self {
            optimiser: OptimiserConfig {
                max_concurrency: 1,
                ..OptimiserConfig::default()
            },
            ..Self::default()
        }
    }

    /// Keeps a much deeper league table for exploratory sweeps.
    pub fn wide() -> Self {
        Self {
            optimiser: OptimiserConfig {
                leaderboard_capacity: 50,
                ..OptimiserConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "single_thread", "wide"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            "single_thread" => Ok(Self::single_thread()),
            "wide" => Ok(Self::wide()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: e.to_string(),
        })
    }

    /// Checks every field constraint and returns all violations.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let o = &self.optimiser;
        if o.leaderboard_capacity == 0 {
            errors.push(ConfigError {
                field: "optimiser.leaderboard_capacity".into(),
                message: "must be > 0".into(),
            });
        }
        if o.max_concurrency == 0 {
            errors.push(ConfigError {
                field: "optimiser.max_concurrency".into(),
                message: "must be > 0".into(),
            });
        }

        if self.output.directory.as_os_str().is_empty() {
            errors.push(ConfigError {
                field: "output.directory".into(),
                message: "must not be empty".into(),
            });
        }

        errors
    }
}
