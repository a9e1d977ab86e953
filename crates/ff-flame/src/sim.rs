//! Flame solver over the generic multi-domain driver.

use crate::assembly::{FLOW_DOMAIN, FlameDomains, assemble};
use crate::context::RunContext;
use crate::error::{FlameError, FlameResult};
use crate::flow::{C_EPOTENTIAL, C_TEMPERATURE};
use crate::mixture::MixtureState;
use crate::solver::NonlinearBvpSolver;
use crate::stage::SolveStage;
use ff_oned::{Domain, RefineCriteria, Sim1D, SolutionSnapshot, SolveStats, SolverError, uniform_grid};
use tracing::{debug, info};

/// Inlet, ion flow and outlet on the configured starting grid.
pub struct FlameSim<'a> {
    sim: Sim1D<FlameDomains<'a>>,
}

impl<'a> FlameSim<'a> {
    pub fn new(ctx: &'a RunContext, mixture: &MixtureState) -> FlameResult<Self> {
        let cfg = ctx.config();
        let grid = uniform_grid(cfg.grid.points, cfg.grid.length_m)?;
        let domains = assemble(ctx, mixture, grid)?;
        let mut sim = Sim1D::new(domains)?
            .with_newton(cfg.newton)
            .with_time_step(cfg.time_step.clone());
        sim.set_max_grid_points(FLOW_DOMAIN, cfg.grid.max_points)?;
        Ok(Self { sim })
    }

    pub fn domains(&self) -> &FlameDomains<'a> {
        self.sim.domains()
    }

    pub fn inner(&self) -> &Sim1D<FlameDomains<'a>> {
        &self.sim
    }

    /// Hold the current temperature profile while the energy equation is off.
    fn freeze_temperature(&mut self) -> FlameResult<()> {
        let z = self.sim.domains().flow.grid().to_vec();
        let t = self.sim.profile(FLOW_DOMAIN, C_TEMPERATURE)?;
        self.sim.domains_mut().flow.set_frozen_temperature(z, t);
        Ok(())
    }
}

impl NonlinearBvpSolver for FlameSim<'_> {
    fn n_points(&self) -> usize {
        self.sim.domains().flow.n_points()
    }

    fn grid_point(&self, j: usize) -> FlameResult<f64> {
        self.sim.domains().flow.grid().get(j).copied().ok_or_else(|| {
            SolverError::InvalidState {
                what: format!("grid point {j} out of range"),
            }
            .into()
        })
    }

    fn component_index(&self, name: &str) -> FlameResult<usize> {
        self.sim.domains().flow.component_index(name).ok_or_else(|| {
            SolverError::InvalidState {
                what: format!("flow has no component '{name}'"),
            }
            .into()
        })
    }

    fn work_value(&self, comp: usize, j: usize) -> FlameResult<f64> {
        Ok(self.sim.value(FLOW_DOMAIN, comp, j)?)
    }

    fn set_initial_guess(&mut self, component: &str, locs: &[f64], vals: &[f64]) -> FlameResult<()> {
        let c = self.component_index(component)?;
        self.sim.set_profile(FLOW_DOMAIN, c, locs, vals)?;
        if c == C_TEMPERATURE && !self.sim.domains().flow.energy_enabled() {
            self.freeze_temperature()?;
        }
        Ok(())
    }

    fn insert_point(&mut self, interval: usize, z: f64) -> FlameResult<usize> {
        Ok(self.sim.insert_point(FLOW_DOMAIN, interval, z)?)
    }

    fn set_fixed_temperature(&mut self, j: usize, t: f64) -> FlameResult<()> {
        let z = self.grid_point(j)?;
        self.sim.set_value(FLOW_DOMAIN, C_TEMPERATURE, j, t)?;
        self.sim.domains_mut().flow.set_fixed_temperature(z, t);
        debug!(j, z, t, "temperature fixed");
        Ok(())
    }

    fn fixed_temperature_points(&self) -> Vec<usize> {
        self.sim.domains().flow.fixed_point().into_iter().collect()
    }

    fn set_refine_criteria(&mut self, criteria: RefineCriteria) -> FlameResult<()> {
        Ok(self.sim.set_refine_criteria(FLOW_DOMAIN, criteria)?)
    }

    fn enable_energy(&mut self, on: bool) -> FlameResult<()> {
        if !on {
            self.freeze_temperature()?;
        }
        self.sim.domains_mut().flow.set_energy_enabled(on);
        Ok(())
    }

    fn enable_electric_field(&mut self, on: bool) {
        self.sim.domains_mut().flow.set_field_enabled(on);
    }

    fn set_solving_stage(&mut self, stage: SolveStage) -> FlameResult<()> {
        self.sim.domains_mut().flow.set_stage(stage)
    }

    fn set_inlet_field(&mut self, e: f64) {
        self.sim.domains_mut().inlet.set_e_field(e);
    }

    fn solve(&mut self, loglevel: u8, refine: bool) -> FlameResult<SolveStats> {
        let stats = self.sim.solve(loglevel, refine)?;
        if loglevel > 0 {
            info!(
                points = self.n_points(),
                newton_iterations = stats.newton_iterations,
                time_steps = stats.time_steps,
                points_added = stats.points_added,
                "flame solved"
            );
        }
        Ok(stats)
    }

    fn gap_voltage(&self) -> FlameResult<f64> {
        let phi = self.sim.profile(FLOW_DOMAIN, C_EPOTENTIAL)?;
        match (phi.first(), phi.last()) {
            (Some(first), Some(last)) => Ok(first - last),
            _ => Err(FlameError::contract("flow has no points")),
        }
    }

    fn snapshot(&self, id: &str, description: &str) -> SolutionSnapshot {
        self.sim.snapshot(id, description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;

    #[test]
    fn starts_on_uniform_grid() {
        let ctx = RunContext::new(RunConfig::default()).unwrap();
        let m = MixtureState::initialize(&ctx, 1.0).unwrap();
        let sim = FlameSim::new(&ctx, &m).unwrap();
        assert_eq!(sim.n_points(), 6);
        assert_eq!(sim.grid_point(5).unwrap(), 0.1);
        assert!(sim.grid_point(6).is_err());
        assert!(sim.component_index("nope").is_err());
        assert!(sim.fixed_temperature_points().is_empty());
        assert_eq!(sim.gap_voltage().unwrap(), 0.0);
    }

    #[test]
    fn fixing_a_point_sets_its_temperature() {
        let ctx = RunContext::new(RunConfig::default()).unwrap();
        let m = MixtureState::initialize(&ctx, 1.0).unwrap();
        let mut sim = FlameSim::new(&ctx, &m).unwrap();
        let j = sim.insert_point(2, 0.05).unwrap();
        sim.set_fixed_temperature(j, 1250.0).unwrap();
        assert_eq!(sim.fixed_temperature_points(), vec![3]);
        assert_eq!(sim.work_value(C_TEMPERATURE, 3).unwrap(), 1250.0);
    }

    #[test]
    fn stage_cannot_go_back() {
        let ctx = RunContext::new(RunConfig::default()).unwrap();
        let m = MixtureState::initialize(&ctx, 1.0).unwrap();
        let mut sim = FlameSim::new(&ctx, &m).unwrap();
        sim.set_solving_stage(SolveStage::FieldCoupled).unwrap();
        assert!(sim.set_solving_stage(SolveStage::EnergyOnly).is_err());
    }
}
