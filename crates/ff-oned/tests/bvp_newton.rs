//! Integration tests for the coupled boundary-value driver.

use ff_oned::{
    Domain, DomainKind, DomainSet, EvalContext, NewtonConfig, Sim1D, SolutionSnapshot, SolverError,
    SolverResult,
};

/// Nonlinear diffusion `d/dt y = (y^2)''` with Dirichlet ends. The steady
/// solution is `y = sqrt(a^2 + (b^2 - a^2) z)` on `[0, 1]`, and the discrete
/// equations reproduce it exactly at the nodes.
struct SquareDiffusion {
    z: Vec<f64>,
    left: Option<f64>,
    right: f64,
}

impl SquareDiffusion {
    fn new(n: usize, left: Option<f64>, right: f64) -> Self {
        Self {
            z: (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
            left,
            right,
        }
    }
}

impl Domain for SquareDiffusion {
    fn name(&self) -> &str {
        "bulk"
    }

    fn n_components(&self) -> usize {
        1
    }

    fn component_name(&self, _n: usize) -> String {
        "y".to_string()
    }

    fn bounds(&self, _n: usize) -> (f64, f64) {
        (1e-3, 1e3)
    }

    fn grid(&self) -> &[f64] {
        &self.z
    }

    fn set_grid(&mut self, z: &[f64]) -> SolverResult<()> {
        self.z = z.to_vec();
        Ok(())
    }

    fn initial_value(&self, _n: usize, _j: usize) -> f64 {
        1.5
    }

    fn eval(&self, ctx: &EvalContext<'_>, rsd: &mut [f64], diag: &mut [bool]) -> SolverResult<()> {
        let slot = ctx.slot();
        let last = slot.n_points - 1;
        let sq = |j: usize| ctx.value(0, j) * ctx.value(0, j);
        for j in 0..=last {
            let k = slot.index(0, j);
            if j == 0 {
                // overwritten by a connector when one is present
                rsd[k] = ctx.value(0, 0) - self.left.unwrap_or(0.0);
            } else if j == last {
                rsd[k] = ctx.value(0, j) - self.right;
            } else {
                let dl = self.z[j] - self.z[j - 1];
                let dr = self.z[j + 1] - self.z[j];
                let flux_r = (sq(j + 1) - sq(j)) / dr;
                let flux_l = (sq(j) - sq(j - 1)) / dl;
                rsd[k] = 2.0 * (flux_r - flux_l) / (dl + dr);
                diag[k] = true;
            }
        }
        Ok(())
    }
}

/// Single-point connector owning the left boundary value.
struct LeftValue {
    z: [f64; 1],
    value: f64,
}

impl Domain for LeftValue {
    fn name(&self) -> &str {
        "left"
    }

    fn kind(&self) -> DomainKind {
        DomainKind::Connector
    }

    fn n_components(&self) -> usize {
        1
    }

    fn component_name(&self, _n: usize) -> String {
        "value".to_string()
    }

    fn bounds(&self, _n: usize) -> (f64, f64) {
        (-1e3, 1e3)
    }

    fn grid(&self) -> &[f64] {
        &self.z
    }

    fn set_grid(&mut self, z: &[f64]) -> SolverResult<()> {
        self.z = [z[0]];
        Ok(())
    }

    fn eval(&self, ctx: &EvalContext<'_>, rsd: &mut [f64], diag: &mut [bool]) -> SolverResult<()> {
        let own = ctx.slot().index(0, 0);
        rsd[own] = ctx.x[own] - self.value;
        if let Some(right) = ctx.right() {
            let k = right.index(0, 0);
            rsd[k] = ctx.x[k] - ctx.x[own];
            diag[k] = false;
        }
        Ok(())
    }
}

fn exact(a: f64, b: f64, z: f64) -> f64 {
    (a * a + (b * b - a * a) * z).sqrt()
}

#[test]
fn nonlinear_diffusion_reaches_exact_profile() {
    let domains: Vec<Box<dyn Domain>> = vec![Box::new(SquareDiffusion::new(9, Some(1.0), 2.0))];
    let mut sim = Sim1D::new(domains).unwrap();
    let stats = sim.solve(0, false).unwrap();
    assert!(stats.newton_iterations > 0);

    let z = sim.domains().domain(0).grid().to_vec();
    let y = sim.profile(0, 0).unwrap();
    for (zj, yj) in z.iter().zip(&y) {
        assert!((yj - exact(1.0, 2.0, *zj)).abs() < 1e-3, "z={zj} y={yj}");
    }
    assert_eq!(sim.residual().unwrap().len(), 9);
}

#[test]
fn connector_overwrites_bulk_edge_row() {
    let domains: Vec<Box<dyn Domain>> = vec![
        Box::new(LeftValue {
            z: [0.0],
            value: 1.0,
        }),
        Box::new(SquareDiffusion::new(9, None, 2.0)),
    ];
    let mut sim = Sim1D::new(domains).unwrap();
    assert_eq!(sim.layout().size(), 10);
    sim.solve(0, false).unwrap();

    assert!((sim.value(0, 0, 0).unwrap() - 1.0).abs() < 1e-5);
    let y = sim.profile(1, 0).unwrap();
    assert!((y[0] - 1.0).abs() < 1e-5);
    assert!((y[4] - exact(1.0, 2.0, 0.5)).abs() < 1e-3);
}

#[test]
fn time_stepping_rescues_a_starved_newton() {
    let domains: Vec<Box<dyn Domain>> = vec![Box::new(SquareDiffusion::new(9, Some(1.0), 2.0))];
    // one iteration per attempt is never enough from the flat guess
    let mut sim = Sim1D::new(domains).unwrap().with_newton(NewtonConfig {
        max_iterations: 1,
        ..NewtonConfig::default()
    });
    let stats = sim.solve(0, false).unwrap();
    assert!(stats.time_steps > 0);

    let y = sim.profile(0, 0).unwrap();
    assert!((y[4] - exact(1.0, 2.0, 0.5)).abs() < 1e-3);
}

#[test]
fn connector_with_several_points_rejected() {
    struct Wide(Vec<f64>);
    impl Domain for Wide {
        fn name(&self) -> &str {
            "wide"
        }
        fn kind(&self) -> DomainKind {
            DomainKind::Connector
        }
        fn n_components(&self) -> usize {
            1
        }
        fn component_name(&self, _n: usize) -> String {
            "c".to_string()
        }
        fn bounds(&self, _n: usize) -> (f64, f64) {
            (0.0, 1.0)
        }
        fn grid(&self) -> &[f64] {
            &self.0
        }
        fn set_grid(&mut self, z: &[f64]) -> SolverResult<()> {
            self.0 = z.to_vec();
            Ok(())
        }
        fn eval(&self, _: &EvalContext<'_>, _: &mut [f64], _: &mut [bool]) -> SolverResult<()> {
            Ok(())
        }
    }

    let domains: Vec<Box<dyn Domain>> = vec![Box::new(Wide(vec![0.0, 1.0]))];
    assert!(matches!(
        Sim1D::new(domains),
        Err(SolverError::ProblemSetup { .. })
    ));
}

#[test]
fn snapshot_survives_json() {
    let domains: Vec<Box<dyn Domain>> = vec![
        Box::new(LeftValue {
            z: [0.0],
            value: 1.0,
        }),
        Box::new(SquareDiffusion::new(5, None, 2.0)),
    ];
    let mut sim = Sim1D::new(domains).unwrap();
    sim.solve(0, false).unwrap();

    let snap = sim.snapshot("sol", "Solutions");
    let text = serde_json::to_string_pretty(&snap).unwrap();
    let back: SolutionSnapshot = serde_json::from_str(&text).unwrap();
    assert_eq!(back, snap);
    assert_eq!(back.domains.len(), 2);
    assert_eq!(back.domains[1].grid.len(), 5);
}
