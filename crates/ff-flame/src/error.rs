//! Error types for the flame layer.

use ff_chem::ChemError;
use ff_oned::SolverError;
use ff_results::ResultsError;

/// Flame error type wrapping the engine crates.
#[derive(Debug, thiserror::Error)]
pub enum FlameError {
    #[error("Chemistry error: {0}")]
    Chemistry(#[from] ChemError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Export error: {0}")]
    Export(#[from] ResultsError),

    #[error("Configuration error: {what}")]
    Config { what: String },

    #[error("Failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed domains or grid, or an illegal stage/state transition.
    #[error("Contract violation: {what}")]
    ContractViolation { what: String },
}

impl FlameError {
    pub(crate) fn contract(what: impl Into<String>) -> Self {
        FlameError::ContractViolation { what: what.into() }
    }

    pub(crate) fn config(what: impl Into<String>) -> Self {
        FlameError::Config { what: what.into() }
    }
}

impl From<ff_core::CoreError> for FlameError {
    fn from(err: ff_core::CoreError) -> Self {
        FlameError::Solver(SolverError::Core(err))
    }
}

pub type FlameResult<T> = Result<T, FlameError>;
