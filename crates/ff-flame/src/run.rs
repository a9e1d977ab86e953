//! One flame case from equivalence ratio to files on disk.

use std::time::Instant;

use ff_results::{CaseKey, CaseOutputs, CaseStore, FieldStageStatus, RunManifest, WrittenFiles, compute_run_id};
use tracing::info;

use crate::context::RunContext;
use crate::controller::{ContinuationController, ContinuationResult, ControllerSettings};
use crate::error::FlameResult;
use crate::extract::gap_voltage_table;
use crate::guess::InitialGuess;
use crate::mixture::MixtureState;
use crate::sim::FlameSim;
use crate::solver::NonlinearBvpSolver;

pub const SOLVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Snapshot id and description stored with every solution.
pub const SNAPSHOT_ID: &str = "sol";
pub const SNAPSHOT_DESCRIPTION: &str = "Solutions";

/// Request to compute one case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaseRequest {
    pub phi: f64,
    /// Field applied at the inlet [V/m]
    pub e_field: f64,
    pub refine_grid: bool,
    pub loglevel: u8,
}

impl CaseRequest {
    pub fn new(phi: f64, e_field: f64) -> Self {
        Self {
            phi,
            e_field,
            refine_grid: true,
            loglevel: 1,
        }
    }

    pub fn key(&self) -> CaseKey {
        CaseKey::new(self.phi, self.e_field)
    }
}

/// Wall-clock split of one case.
#[derive(Debug, Clone, Default)]
pub struct CaseTimingSummary {
    pub solve_time_s: f64,
    pub save_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone)]
pub struct CaseReport {
    pub key: CaseKey,
    pub outcome: ContinuationResult,
    pub manifest: RunManifest,
    pub files: WrittenFiles,
    pub timing: CaseTimingSummary,
}

/// Guess, solve in stages and export, on a solver built for `mixture`.
pub fn execute<S: NonlinearBvpSolver + ?Sized>(
    solver: &mut S,
    ctx: &RunContext,
    mixture: &MixtureState,
    request: &CaseRequest,
    store: &CaseStore,
) -> FlameResult<CaseReport> {
    let started = Instant::now();
    let config = ctx.config();

    let guess = InitialGuess::from_mixture(mixture, &ctx.eos().species_names(), &config.guess_locations)?;
    guess.apply(solver)?;

    let mut controller = ContinuationController::new(ControllerSettings {
        e_field: request.e_field,
        refine_grid: request.refine_grid,
        loglevel: request.loglevel,
        refine: config.refine,
    });
    let outcome = controller.run(solver, mixture)?;
    let solve_time_s = started.elapsed().as_secs_f64();

    let save_started = Instant::now();
    let key = request.key();
    let manifest = RunManifest {
        run_id: compute_run_id(&key, config, SOLVER_VERSION),
        timestamp: chrono::Utc::now().to_rfc3339(),
        phi: request.phi,
        e_field: request.e_field,
        t_adiabatic_k: outcome.t_adiabatic,
        flame_speed_mps: outcome.flame_speed,
        gap_voltage_v: match outcome.field_stage {
            FieldStageStatus::Converged => Some(outcome.last_gap_voltage()),
            FieldStageStatus::Failed { .. } => None,
        },
        field_stage: outcome.field_stage.clone(),
        n_points: outcome.profile.n_points(),
        solver_version: SOLVER_VERSION.to_string(),
    };
    let gap_voltage = gap_voltage_table(&outcome.gap_voltage)?;
    let profile = outcome.profile.to_table()?;
    let snapshot = solver.snapshot(SNAPSHOT_ID, SNAPSHOT_DESCRIPTION);
    let files = store.save_case(
        &key,
        &CaseOutputs {
            gap_voltage: &gap_voltage,
            profile: &profile,
            snapshot: &snapshot,
            manifest: &manifest,
        },
    )?;
    let save_time_s = save_started.elapsed().as_secs_f64();

    info!(
        phi = request.phi,
        e_field = request.e_field,
        flame_speed = outcome.flame_speed,
        gap_voltage = outcome.last_gap_voltage(),
        profile = %files.profile.display(),
        "case saved"
    );

    Ok(CaseReport {
        key,
        outcome,
        manifest,
        files,
        timing: CaseTimingSummary {
            solve_time_s,
            save_time_s,
            total_time_s: started.elapsed().as_secs_f64(),
        },
    })
}

/// Build the mixture and the flame solver for `request`, then [`execute`].
pub fn run_case(ctx: &RunContext, request: &CaseRequest, store: &CaseStore) -> FlameResult<CaseReport> {
    let mixture = MixtureState::initialize(ctx, request.phi)?;
    let mut sim = FlameSim::new(ctx, &mixture)?;
    execute(&mut sim, ctx, &mixture, request, store)
}
