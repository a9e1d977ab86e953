//! Grid refinement through the driver.

use ff_oned::{Domain, DomainSet, EvalContext, RefineCriteria, Sim1D, SolverError, SolverResult};

/// `y'' = 0` with `y(0) = 0`, `y(1) = 2`.
struct Straight {
    z: Vec<f64>,
}

impl Domain for Straight {
    fn name(&self) -> &str {
        "straight"
    }

    fn n_components(&self) -> usize {
        1
    }

    fn component_name(&self, _n: usize) -> String {
        "y".to_string()
    }

    fn bounds(&self, _n: usize) -> (f64, f64) {
        (-10.0, 10.0)
    }

    fn grid(&self) -> &[f64] {
        &self.z
    }

    fn set_grid(&mut self, z: &[f64]) -> SolverResult<()> {
        self.z = z.to_vec();
        Ok(())
    }

    fn eval(&self, ctx: &EvalContext<'_>, rsd: &mut [f64], _diag: &mut [bool]) -> SolverResult<()> {
        let slot = ctx.slot();
        let last = slot.n_points - 1;
        for j in 0..=last {
            let k = slot.index(0, j);
            rsd[k] = if j == 0 {
                ctx.value(0, 0)
            } else if j == last {
                ctx.value(0, j) - 2.0
            } else {
                let dl = self.z[j] - self.z[j - 1];
                let dr = self.z[j + 1] - self.z[j];
                (ctx.value(0, j + 1) - ctx.value(0, j)) / dr
                    - (ctx.value(0, j) - ctx.value(0, j - 1)) / dl
            };
        }
        Ok(())
    }
}

fn sim(z: Vec<f64>) -> Sim1D<Vec<Box<dyn Domain>>> {
    let domains: Vec<Box<dyn Domain>> = vec![Box::new(Straight { z })];
    Sim1D::new(domains).unwrap()
}

const TIGHT_SLOPE: RefineCriteria = RefineCriteria {
    ratio: 10.0,
    slope: 0.3,
    curve: 1.0,
};

#[test]
fn default_criteria_leave_a_resolved_profile_alone() {
    let mut s = sim(vec![0.0, 0.25, 0.5, 1.0]);
    let stats = s.solve(0, true).unwrap();
    assert_eq!(stats.points_added, 0);
    assert_eq!(s.domains().domain(0).grid().len(), 4);
}

#[test]
fn slope_criterion_splits_the_wide_interval() {
    let mut s = sim(vec![0.0, 0.25, 0.5, 1.0]);
    s.set_refine_criteria(0, TIGHT_SLOPE).unwrap();
    let stats = s.solve(0, true).unwrap();
    assert_eq!(stats.points_added, 1);
    assert_eq!(s.domains().domain(0).grid(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
    let y = s.profile(0, 0).unwrap();
    assert!((y[3] - 1.5).abs() < 1e-6);
}

#[test]
fn refinement_keeps_existing_points() {
    let mut s = sim((0..6).map(|i| i as f64 / 5.0).collect());
    s.set_profile(0, 0, &[0.0, 0.5, 0.5, 1.0], &[0.0, 0.0, 1.0, 1.0])
        .unwrap();
    let before = s.domains().domain(0).grid().to_vec();
    let added = s.refine(0).unwrap();
    assert!(added > 0);

    let after = s.domains().domain(0).grid().to_vec();
    assert_eq!(after.len(), before.len() + added);
    assert!(after.windows(2).all(|w| w[1] > w[0]));
    for z in &before {
        assert!(after.contains(z));
    }
}

#[test]
fn grid_limit_surfaces_from_solve() {
    let mut s = sim(vec![0.0, 0.25, 0.5, 1.0]);
    s.set_refine_criteria(0, TIGHT_SLOPE).unwrap();
    s.set_max_grid_points(0, 4).unwrap();
    assert!(matches!(
        s.solve(0, true),
        Err(SolverError::GridLimit { max: 4 })
    ));
    // a failed solve leaves the entry state behind
    assert_eq!(s.domains().domain(0).grid().len(), 4);
    assert_eq!(s.profile(0, 0).unwrap(), vec![0.0; 4]);
}

#[test]
fn invalid_criteria_rejected() {
    let mut s = sim(vec![0.0, 1.0]);
    let bad = RefineCriteria {
        slope: 1.5,
        ..RefineCriteria::default()
    };
    assert!(s.set_refine_criteria(0, bad).is_err());
    assert_eq!(s.refine_criteria(0), Some(RefineCriteria::default()));
}
