//! Error types for the simulator.

use thiserror::Error;

use crate::simulation::states::NVec3;

#[derive(Debug, Error)]
pub enum SimError {
    /// Rejected construction parameters. Raised before any step runs.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A particle mapped to a cell outside the grid. Boundary enforcement
    /// should have caught it first, so this aborts the run.
    #[error("particle {id} at ({}, {}, {}) lies outside the domain", .position.x, .position.y, .position.z)]
    OutOfDomain { id: u32, position: NVec3 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SimError::Configuration(msg.into())
    }
}
