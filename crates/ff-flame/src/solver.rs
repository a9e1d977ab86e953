//! The seam between the continuation controller and a BVP solver.

use crate::error::FlameResult;
use crate::stage::SolveStage;
use ff_oned::{RefineCriteria, SolutionSnapshot, SolveStats};

/// Operations the controller needs from a flame solver.
///
/// Point indices and component indices refer to the flow domain.
pub trait NonlinearBvpSolver {
    fn n_points(&self) -> usize;

    fn grid_point(&self, j: usize) -> FlameResult<f64>;

    fn component_index(&self, name: &str) -> FlameResult<usize>;

    /// Current value of component `comp` at point `j`.
    fn work_value(&self, comp: usize, j: usize) -> FlameResult<f64>;

    /// Piecewise-linear profile through `vals` at relative positions `locs`.
    fn set_initial_guess(&mut self, component: &str, locs: &[f64], vals: &[f64]) -> FlameResult<()>;

    /// Insert a point at `z` inside interval `interval`; returns its index.
    fn insert_point(&mut self, interval: usize, z: f64) -> FlameResult<usize>;

    /// Pin the temperature of point `j`.
    fn set_fixed_temperature(&mut self, j: usize, t: f64) -> FlameResult<()>;

    fn fixed_temperature_points(&self) -> Vec<usize>;

    fn set_refine_criteria(&mut self, criteria: RefineCriteria) -> FlameResult<()>;

    fn enable_energy(&mut self, on: bool) -> FlameResult<()>;

    fn enable_electric_field(&mut self, on: bool);

    fn set_solving_stage(&mut self, stage: SolveStage) -> FlameResult<()>;

    /// Field applied at the inlet [V/m].
    fn set_inlet_field(&mut self, e: f64);

    fn solve(&mut self, loglevel: u8, refine: bool) -> FlameResult<SolveStats>;

    /// Potential drop across the flow, `φ(z0) - φ(zL)`.
    fn gap_voltage(&self) -> FlameResult<f64>;

    fn snapshot(&self, id: &str, description: &str) -> SolutionSnapshot;

    fn grid(&self) -> FlameResult<Vec<f64>> {
        (0..self.n_points()).map(|j| self.grid_point(j)).collect()
    }

    fn profile(&self, component: &str) -> FlameResult<Vec<f64>> {
        let c = self.component_index(component)?;
        (0..self.n_points()).map(|j| self.work_value(c, j)).collect()
    }
}
