//! Damped Newton iteration with bound-respecting steps and Jacobian reuse.

use crate::banded::BandMatrix;
use crate::error::{SolverError, SolverResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Newton solver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonConfig {
    /// Maximum Newton iterations per solve
    pub max_iterations: usize,
    /// Steps taken with one Jacobian before it is recomputed
    pub max_jac_age: usize,
    /// Step reduction per damping trial
    pub damp_factor: f64,
    /// Maximum damping trials per step
    pub n_damp: usize,
    /// Relative finite-difference perturbation
    pub fd_rel_step: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            max_jac_age: 10,
            damp_factor: std::f64::consts::SQRT_2,
            n_damp: 7,
            fd_rel_step: 1e-5,
        }
    }
}

/// Newton iteration result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonResult {
    /// Number of iterations
    pub iterations: usize,
    /// Number of Jacobian evaluations
    pub jac_evals: usize,
    /// Weighted norm of the last undamped step
    pub step_norm: f64,
}

/// Nonlinear system as seen by the Newton driver.
pub trait NewtonSystem {
    fn size(&self) -> usize;

    fn residual(&self, x: &[f64], out: &mut [f64]) -> SolverResult<()>;

    /// Factored Jacobian at `x`, where `r0` is the residual at `x`.
    fn jacobian(&self, x: &[f64], r0: &[f64]) -> SolverResult<BandMatrix>;

    /// Error weight of each unknown; a step is converged once its weighted
    /// RMS norm drops below one.
    fn error_weights(&self, x: &[f64]) -> Vec<f64>;

    fn bounds(&self, i: usize) -> (f64, f64);
}

/// Weighted RMS norm.
pub fn weighted_norm(step: &[f64], ewt: &[f64]) -> f64 {
    if step.is_empty() {
        return 0.0;
    }
    let sum: f64 = step
        .iter()
        .zip(ewt)
        .map(|(s, w)| (s / w) * (s / w))
        .sum();
    (sum / step.len() as f64).sqrt()
}

/// Largest fraction in `(0, 1]` of `step` that keeps `x` within bounds.
fn bound_step<S: NewtonSystem + ?Sized>(sys: &S, x: &[f64], step: &[f64]) -> f64 {
    let mut fbound = 1.0_f64;
    for i in 0..x.len() {
        let (below, above) = sys.bounds(i);
        let val = x[i];
        let new_val = val + step[i];
        if new_val > above {
            fbound = fbound.min((above - val) / (new_val - val)).max(0.0);
        } else if new_val < below {
            fbound = fbound.min((val - below) / (val - new_val)).max(0.0);
        }
    }
    fbound
}

fn newton_step<S: NewtonSystem + ?Sized>(
    sys: &S,
    jac: &BandMatrix,
    x: &[f64],
    step: &mut [f64],
) -> SolverResult<()> {
    sys.residual(x, step)?;
    jac.solve(step)?;
    step.iter_mut().for_each(|s| *s = -*s);
    if step.iter().any(|s| !s.is_finite()) {
        return Err(SolverError::Numeric {
            what: "non-finite Newton step".to_string(),
        });
    }
    Ok(())
}

enum Damped {
    Converged(f64),
    Accepted(f64),
    Failed,
}

/// Try successively shorter fractions of `step0` until the next undamped
/// step shrinks. On success `x1` holds the accepted point.
fn damp_step<S: NewtonSystem + ?Sized>(
    sys: &S,
    jac: &BandMatrix,
    x0: &[f64],
    step0: &[f64],
    ewt: &[f64],
    x1: &mut [f64],
    config: &NewtonConfig,
) -> SolverResult<Damped> {
    let s0 = weighted_norm(step0, ewt);
    let fbound = bound_step(sys, x0, step0);
    if fbound < 1e-10 {
        debug!("Newton step blocked by bounds");
        return Ok(Damped::Failed);
    }

    let mut step1 = vec![0.0; x0.len()];
    let mut alpha = fbound;
    for m in 0..config.n_damp {
        for i in 0..x0.len() {
            x1[i] = x0[i] + alpha * step0[i];
        }
        match newton_step(sys, jac, x1, &mut step1) {
            Ok(()) => {
                let s1 = weighted_norm(&step1, ewt);
                debug!(m, alpha, s0, s1, "damping trial");
                if s1 < 1.0 {
                    return Ok(Damped::Converged(s1));
                }
                if s1 < s0 {
                    return Ok(Damped::Accepted(s1));
                }
            }
            Err(err) if err.is_recoverable() => debug!(m, alpha, "damping trial failed: {err}"),
            Err(err) => return Err(err),
        }
        alpha /= config.damp_factor;
    }
    Ok(Damped::Failed)
}

/// Solve `sys(x) = 0` starting from `x`, which holds the solution on success.
pub fn newton_solve<S: NewtonSystem + ?Sized>(
    sys: &S,
    x: &mut [f64],
    config: &NewtonConfig,
) -> SolverResult<NewtonResult> {
    let n = sys.size();
    if x.len() != n {
        return Err(SolverError::InvalidState {
            what: format!("initial guess has {} entries, system has {}", x.len(), n),
        });
    }

    let mut jac: Option<BandMatrix> = None;
    let mut jac_age = 0;
    let mut jac_evals = 0;
    let mut r0 = vec![0.0; n];
    let mut step0 = vec![0.0; n];
    let mut x1 = vec![0.0; n];

    for iter in 0..config.max_iterations {
        let current = match jac.take() {
            Some(j) if jac_age < config.max_jac_age => j,
            _ => {
                sys.residual(x, &mut r0)?;
                jac_evals += 1;
                jac_age = 0;
                sys.jacobian(x, &r0)?
            }
        };

        newton_step(sys, &current, x, &mut step0)?;
        let ewt = sys.error_weights(x);

        match damp_step(sys, &current, x, &step0, &ewt, &mut x1, config)? {
            Damped::Converged(step_norm) => {
                x.copy_from_slice(&x1);
                debug!(iter, jac_evals, step_norm, "Newton converged");
                return Ok(NewtonResult {
                    iterations: iter + 1,
                    jac_evals,
                    step_norm,
                });
            }
            Damped::Accepted(step_norm) => {
                x.copy_from_slice(&x1);
                jac_age += 1;
                jac = Some(current);
                debug!(iter, step_norm, "Newton step accepted");
            }
            Damped::Failed if jac_age > 0 => {
                // retry with a fresh Jacobian
                jac_age = config.max_jac_age;
            }
            Damped::Failed => {
                return Err(SolverError::ConvergenceFailed {
                    what: format!("damped Newton step failed at iteration {iter}"),
                });
            }
        }
    }

    Err(SolverError::ConvergenceFailed {
        what: format!("Maximum iterations {} reached", config.max_iterations),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x^2 - 4 = 0 with x kept positive.
    struct Quadratic;

    impl NewtonSystem for Quadratic {
        fn size(&self) -> usize {
            1
        }

        fn residual(&self, x: &[f64], out: &mut [f64]) -> SolverResult<()> {
            out[0] = x[0] * x[0] - 4.0;
            Ok(())
        }

        fn jacobian(&self, x: &[f64], _r0: &[f64]) -> SolverResult<BandMatrix> {
            let mut j = BandMatrix::new(1, 0, 0);
            j.set(0, 0, 2.0 * x[0]);
            j.factor()?;
            Ok(j)
        }

        fn error_weights(&self, _x: &[f64]) -> Vec<f64> {
            vec![1e-8]
        }

        fn bounds(&self, _i: usize) -> (f64, f64) {
            (0.0, 1e3)
        }
    }

    #[test]
    fn simple_quadratic() {
        let mut x = vec![3.0];
        let result = newton_solve(&Quadratic, &mut x, &NewtonConfig::default()).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-6);
        assert!(result.iterations > 1);
    }

    #[test]
    fn bounds_limit_the_step() {
        // from x = 0.5 the full step lands at 4.25, inside bounds
        assert_eq!(bound_step(&Quadratic, &[0.5], &[3.75]), 1.0);
        // a step to -1 is cut where it reaches zero
        let f = bound_step(&Quadratic, &[1.0], &[-2.0]);
        assert!((f - 0.5).abs() < 1e-12);
    }

    #[test]
    fn weighted_norm_scales_by_weights() {
        assert_eq!(weighted_norm(&[2.0, 2.0], &[2.0, 2.0]), 1.0);
        assert_eq!(weighted_norm(&[], &[]), 0.0);
    }

    #[test]
    fn wrong_length_rejected() {
        let mut x = vec![1.0, 2.0];
        assert!(newton_solve(&Quadratic, &mut x, &NewtonConfig::default()).is_err());
    }
}
