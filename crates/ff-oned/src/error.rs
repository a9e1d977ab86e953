//! Error types for the boundary-value solver.

use ff_core::CoreError;
use thiserror::Error;

/// Errors that can occur while assembling or solving a 1-D problem.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Invalid state: {what}")]
    InvalidState { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Grid refinement would exceed {max} points")]
    GridLimit { max: usize },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SolverError {
    /// Failures the driver may recover from by time stepping.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SolverError::ConvergenceFailed { .. } | SolverError::Numeric { .. }
        )
    }
}

pub type SolverResult<T> = Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_split() {
        assert!(SolverError::Numeric { what: "x".into() }.is_recoverable());
        assert!(!SolverError::GridLimit { max: 10 }.is_recoverable());
        assert!(!SolverError::ProblemSetup { what: "x".into() }.is_recoverable());
    }
}
