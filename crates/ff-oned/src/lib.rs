//! Multi-domain one-dimensional boundary-value solver.
//!
//! A problem is an ordered set of [`Domain`]s. Bulk domains own a grid and
//! nearest-neighbour residuals; connectors sit between them as single points.
//! [`Sim1D`] assembles the banded system, solves it with damped Newton,
//! falls back to pseudo-transient continuation and refines the grid.

pub mod banded;
pub mod domain;
pub mod error;
pub mod grid;
pub mod jacobian;
pub mod newton;
pub mod refine;
pub mod sim1d;
pub mod snapshot;
pub mod timestep;

pub use banded::BandMatrix;
pub use domain::{Domain, DomainKind, DomainSet, DomainSlot, EvalContext, Layout};
pub use error::{SolverError, SolverResult};
pub use grid::{normalized_position, uniform_grid, validate_grid};
pub use newton::{NewtonConfig, NewtonResult, NewtonSystem, newton_solve};
pub use refine::{RefineCriteria, Refiner};
pub use sim1d::{Sim1D, SolveStats};
pub use snapshot::{ComponentSnapshot, DomainSnapshot, SolutionSnapshot};
pub use timestep::TimeStepConfig;
