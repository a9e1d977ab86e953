//! Staged continuation of a freely propagating flame.
//!
//! 1. Anchor: pin the temperature halfway between inflow and adiabatic at
//!    the first point the guess reaches it, inserting a point if needed.
//! 2. Energy-only solve with grid refinement. Errors end the run.
//! 3. Field-coupled solve from the stage-1 state. Solver errors are logged
//!    and leave a NaN gap voltage.
//! 4. Extract the profiles.

use crate::error::{FlameError, FlameResult};
use crate::extract::FlameProfile;
use crate::mixture::MixtureState;
use crate::solver::NonlinearBvpSolver;
use crate::stage::{ControllerEvent, ControllerState, SolveStage};
use ff_oned::{RefineCriteria, SolverError};
use ff_results::FieldStageStatus;
use tracing::{info, warn};

/// Where the anchored temperature goes on the current grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorPoint {
    Existing(usize),
    Insert { interval: usize, z: f64 },
}

/// First crossing of `t_target` by the profile `t` over grid `z`.
///
/// A crossing within `1e-8` of the interval width from a grid point reuses
/// that point.
pub fn locate_anchor(z: &[f64], t: &[f64], t_target: f64) -> FlameResult<AnchorPoint> {
    if z.len() != t.len() || z.len() < 2 {
        return Err(FlameError::contract("anchor needs matching grid and temperature of at least 2 points"));
    }
    for j in 0..z.len() - 1 {
        let (ta, tb) = (t[j], t[j + 1]);
        if ta == t_target {
            return Ok(AnchorPoint::Existing(j));
        }
        if (ta - t_target) * (tb - t_target) < 0.0 {
            let dz = z[j + 1] - z[j];
            let zc = z[j] + dz * (t_target - ta) / (tb - ta);
            let tol = 1e-8 * dz;
            return Ok(if (zc - z[j]).abs() <= tol {
                AnchorPoint::Existing(j)
            } else if (z[j + 1] - zc).abs() <= tol {
                AnchorPoint::Existing(j + 1)
            } else {
                AnchorPoint::Insert { interval: j, z: zc }
            });
        }
    }
    match t.last() {
        Some(&tl) if tl == t_target => Ok(AnchorPoint::Existing(t.len() - 1)),
        _ => Err(SolverError::ProblemSetup {
            what: format!("temperature guess never reaches {t_target:.1} K"),
        }
        .into()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    /// Field applied at the inlet in stage 2 [V/m]
    pub e_field: f64,
    pub refine_grid: bool,
    pub loglevel: u8,
    pub refine: RefineCriteria,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinuationResult {
    pub profile: FlameProfile,
    /// `(field, gap voltage)` rows; NaN voltage when stage 2 failed
    pub gap_voltage: Vec<(f64, f64)>,
    pub field_stage: FieldStageStatus,
    pub flame_speed: f64,
    pub t_adiabatic: f64,
    /// Index of the anchored point after extraction
    pub fixed_point: usize,
}

impl ContinuationResult {
    pub fn last_gap_voltage(&self) -> f64 {
        self.gap_voltage.last().map_or(f64::NAN, |&(_, v)| v)
    }
}

pub struct ContinuationController {
    settings: ControllerSettings,
    state: ControllerState,
    stage: Option<SolveStage>,
}

impl ContinuationController {
    pub fn new(settings: ControllerSettings) -> Self {
        Self {
            settings,
            state: ControllerState::Created,
            stage: None,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Stage last handed to the solver.
    pub fn stage(&self) -> Option<SolveStage> {
        self.stage
    }

    fn transition(&mut self, event: ControllerEvent) -> FlameResult<()> {
        self.state = self.state.on(event)?;
        Ok(())
    }

    /// Run every stage on `solver`, which must already hold the initial guess.
    pub fn run<S: NonlinearBvpSolver + ?Sized>(
        &mut self,
        solver: &mut S,
        mixture: &MixtureState,
    ) -> FlameResult<ContinuationResult> {
        if self.state.is_terminal() {
            return Err(FlameError::contract("controller has already extracted its result"));
        }
        self.anchor(solver, mixture)?;
        self.stage1(solver)?;
        let (gap, field_stage) = self.stage2(solver)?;

        let profile = FlameProfile::extract(solver)?;
        let fixed = self.single_fixed_point(solver)?;
        self.transition(ControllerEvent::Extract)?;

        Ok(ContinuationResult {
            flame_speed: profile.flame_speed(),
            profile,
            gap_voltage: vec![(self.settings.e_field, gap)],
            field_stage,
            t_adiabatic: mixture.t_adiabatic.value,
            fixed_point: fixed,
        })
    }

    fn single_fixed_point<S: NonlinearBvpSolver + ?Sized>(&self, solver: &S) -> FlameResult<usize> {
        match solver.fixed_temperature_points().as_slice() {
            [j] => Ok(*j),
            other => Err(FlameError::contract(format!(
                "expected one fixed-temperature point, found {}",
                other.len()
            ))),
        }
    }

    fn anchor<S: NonlinearBvpSolver + ?Sized>(&mut self, solver: &mut S, mixture: &MixtureState) -> FlameResult<usize> {
        if !solver.fixed_temperature_points().is_empty() {
            return Err(FlameError::contract("solver already has a fixed-temperature point"));
        }
        let t_mid = mixture.t_mid();
        let z = solver.grid()?;
        let t = solver.profile("T")?;
        let j = match locate_anchor(&z, &t, t_mid)? {
            AnchorPoint::Existing(j) => j,
            AnchorPoint::Insert { interval, z } => solver.insert_point(interval, z)?,
        };
        solver.set_fixed_temperature(j, t_mid)?;
        info!(point = j, z = solver.grid_point(j)?, t_fixed = t_mid, "flame anchored");
        self.transition(ControllerEvent::Anchor)?;
        Ok(j)
    }

    fn stage1<S: NonlinearBvpSolver + ?Sized>(&mut self, solver: &mut S) -> FlameResult<()> {
        let s = &self.settings;
        solver.set_refine_criteria(s.refine)?;
        solver.enable_energy(true)?;
        solver.enable_electric_field(true);
        solver.set_solving_stage(SolveStage::EnergyOnly)?;
        self.stage = Some(SolveStage::EnergyOnly);
        info!(stage = SolveStage::EnergyOnly.marker(), "solving with the energy equation");
        solver.solve(s.loglevel, s.refine_grid)?;
        self.single_fixed_point(solver)?;
        self.transition(ControllerEvent::Stage1Solved)
    }

    fn stage2<S: NonlinearBvpSolver + ?Sized>(&mut self, solver: &mut S) -> FlameResult<(f64, FieldStageStatus)> {
        if self.state != ControllerState::Stage1Converged {
            return Err(FlameError::contract("field-coupled stage before stage 1 converged"));
        }
        let current = self
            .stage
            .ok_or_else(|| FlameError::contract("no stage set before the field-coupled solve"))?;
        let target = current
            .next()
            .ok_or_else(|| FlameError::contract(format!("no stage follows stage {}", current.marker())))?;
        self.stage = Some(current.advance_to(target)?);

        let s = &self.settings;
        solver.set_inlet_field(s.e_field);
        solver.set_solving_stage(target)?;
        info!(stage = target.marker(), e_field = s.e_field, "solving with the electric field");

        match solver.solve(s.loglevel, s.refine_grid) {
            Ok(_) => {
                let gap = solver.gap_voltage()?;
                info!(gap_voltage = gap, "field-coupled stage converged");
                self.transition(ControllerEvent::Stage2Solved)?;
                Ok((gap, FieldStageStatus::Converged))
            }
            Err(FlameError::Solver(err)) => {
                warn!(e_field = s.e_field, "field-coupled stage failed: {err}");
                let message = err.to_string();
                self.transition(ControllerEvent::Stage2Failed)?;
                Ok((f64::NAN, FieldStageStatus::Failed { message }))
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_inserts_midpoint_of_default_guess() {
        let z = [0.0, 0.02, 0.04, 0.06, 0.08, 0.1];
        let t = [300.0, 300.0, 775.0, 1725.0, 2200.0, 2200.0];
        match locate_anchor(&z, &t, 1250.0).unwrap() {
            AnchorPoint::Insert { interval, z } => {
                assert_eq!(interval, 2);
                assert!((z - 0.05).abs() < 1e-15);
            }
            other => panic!("expected insertion, got {other:?}"),
        }
    }

    #[test]
    fn anchor_reuses_nearby_point() {
        let z = [0.0, 0.5, 1.0];
        let t = [300.0, 1000.0, 2000.0];
        assert_eq!(locate_anchor(&z, &t, 1000.0).unwrap(), AnchorPoint::Existing(1));
        assert_eq!(
            locate_anchor(&z, &t, 1000.0 + 1e-9).unwrap(),
            AnchorPoint::Existing(1)
        );
    }

    #[test]
    fn anchor_needs_a_crossing() {
        let z = [0.0, 0.5, 1.0];
        let t = [300.0, 300.0, 300.0];
        assert!(locate_anchor(&z, &t, 1000.0).is_err());
        assert!(locate_anchor(&z, &t[..2], 300.0).is_err());
    }
}
