//! Chemistry engine errors.

use ff_core::CoreError;
use thiserror::Error;

/// Result type for chemistry operations.
pub type ChemResult<T> = Result<T, ChemError>;

/// Errors raised by thermodynamics, equilibrium, kinetics and transport.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChemError {
    /// Non-physical values (negative temperature, pressure, fractions).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Species name not present in the mechanism.
    #[error("Unknown species: {name}")]
    UnknownSpecies { name: String },

    /// Composition string could not be parsed.
    #[error("Malformed composition '{input}': {reason}")]
    Parse { input: String, reason: &'static str },

    /// Iterative solve did not converge (equilibrium, temperature inversion).
    #[error("Convergence failed for {what}")]
    ConvergenceFailed { what: &'static str },

    /// Linear system in an iterative solve became singular.
    #[error("Singular matrix in {what}")]
    Singular { what: &'static str },

    #[error(transparent)]
    Core(#[from] CoreError),
}
