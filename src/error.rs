//! Error taxonomy shared by the optimiser, task generator and loaders.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors. A scenario that hits an unsupported code path is not an
/// error; see [`crate::sim::types::SimulationDefect`].
#[derive(Debug, Error)]
pub enum EpochError {
    /// Malformed parameter grid, invalid range bounds, unknown parameter,
    /// invalid engine configuration or undetectable hardware concurrency.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A scenario index outside `[1, total]` was requested.
    #[error("scenario index {index} is outside the sweep (1..={total})")]
    ScenarioIndex { index: u64, total: u64 },

    /// A required file could not be read or written.
    #[error("cannot access \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A CSV file could not be parsed or written.
    #[error("csv error in \"{}\": {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An operation was called out of order.
    #[error("state error: {0}")]
    State(String),
}

impl EpochError {
    /// Shorthand for [`EpochError::Configuration`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EpochError>;
