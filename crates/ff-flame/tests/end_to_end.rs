//! Full flame solves on the reference engines. Slow; run with `--ignored`.

use ff_core::constants::{BOLTZMANN, ELEMENTARY_CHARGE};
use ff_flame::{CaseRequest, RunConfig, RunContext, run_case};
use ff_results::{CaseStore, FieldStageStatus};

fn context() -> RunContext {
    RunContext::new(RunConfig::default()).unwrap()
}

#[test]
#[ignore = "full flame solve"]
fn stoichiometric_flame_without_field() {
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();
    let store = CaseStore::new(dir.path().to_path_buf()).unwrap();
    let request = CaseRequest {
        loglevel: 0,
        ..CaseRequest::new(1.0, 0.0)
    };
    let report = run_case(&ctx, &request, &store).unwrap();
    let out = &report.outcome;

    assert!(out.field_stage.is_converged());
    // only the ambipolar diffusion potential remains without an applied field
    let thermal_voltage = BOLTZMANN * out.t_adiabatic / ELEMENTARY_CHARGE;
    let gap = out.last_gap_voltage();
    assert!(gap.abs() < 5.0 * thermal_voltage, "gap {gap} V");

    let t = &out.profile.temperature;
    assert!((t[0] - 300.0).abs() < 1e-6);
    let peak = t
        .iter()
        .enumerate()
        .fold(0, |best, (j, &tj)| if tj > t[best] { j } else { best });
    assert!(t[..=peak].windows(2).all(|w| w[1] >= w[0] - 1e-6));
    assert!(t[peak..].iter().all(|&tj| (t[peak] - tj) < 0.01 * out.t_adiabatic));
    let t_end = t[t.len() - 1];
    assert!((t_end - out.t_adiabatic).abs() < 0.05 * out.t_adiabatic);
    assert!(out.flame_speed > 0.0);
    assert!(out.profile.n_points() > 7);

    let driven = run_case(
        &ctx,
        &CaseRequest {
            loglevel: 0,
            ..CaseRequest::new(1.0, 1000.0)
        },
        &store,
    )
    .unwrap();
    if driven.outcome.field_stage.is_converged() {
        assert!(gap.abs() < 0.1 * driven.outcome.last_gap_voltage().abs());
    }
}

#[test]
#[ignore = "full flame solve"]
fn lean_flame_with_field_never_errors_in_stage_two() {
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();
    let store = CaseStore::new(dir.path().to_path_buf()).unwrap();
    let request = CaseRequest {
        loglevel: 0,
        ..CaseRequest::new(0.6, 1000.0)
    };
    let report = run_case(&ctx, &request, &store).unwrap();

    match &report.outcome.field_stage {
        FieldStageStatus::Converged => assert!(report.outcome.last_gap_voltage().is_finite()),
        FieldStageStatus::Failed { .. } => assert!(report.outcome.last_gap_voltage().is_nan()),
    }
    assert!(report.files.gap_voltage.exists());
    assert!(report.files.profile.exists());
}
