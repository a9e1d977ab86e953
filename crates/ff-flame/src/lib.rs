//! ff-flame: freely propagating premixed flame with an applied electric field.
//!
//! A case runs in this order:
//! - [`MixtureState::initialize`] blends fuel and oxidizer and equilibrates
//! - [`FlameSim::new`] assembles inlet, ion flow and outlet on a uniform grid
//! - [`InitialGuess`] lays piecewise-linear profiles between the two states
//! - [`ContinuationController`] anchors the flame and solves in two stages
//! - [`run::execute`] writes the tables, the snapshot and the manifest
//!
//! The controller sees the solver only through [`NonlinearBvpSolver`].
//! Engines and configuration live in a [`RunContext`] that cases share
//! read-only, which lets [`run_sweep`] run cases in parallel.

pub mod assembly;
pub mod boundary;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod extract;
pub mod flow;
pub mod guess;
pub mod mixture;
pub mod run;
pub mod sim;
pub mod solver;
pub mod stage;
pub mod sweep;

pub use assembly::{FLOW_DOMAIN, FlameDomain, FlameDomains, INLET_DOMAIN, OUTLET_DOMAIN, assemble};
pub use boundary::{Inlet1D, Outlet1D};
pub use config::{GridConfig, MixtureConfig, RunConfig};
pub use context::RunContext;
pub use controller::{
    AnchorPoint, ContinuationController, ContinuationResult, ControllerSettings, locate_anchor,
};
pub use error::{FlameError, FlameResult};
pub use extract::{FlameProfile, gap_voltage_table};
pub use flow::IonFlow;
pub use guess::InitialGuess;
pub use mixture::MixtureState;
pub use run::{CaseReport, CaseRequest, CaseTimingSummary, execute, run_case};
pub use sim::FlameSim;
pub use solver::NonlinearBvpSolver;
pub use stage::{ControllerEvent, ControllerState, SolveStage};
pub use sweep::{run_sweep, sweep};
