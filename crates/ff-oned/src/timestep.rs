//! Pseudo-transient continuation used when steady Newton fails.

use crate::error::{SolverError, SolverResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeStepConfig {
    /// First time step [s]
    pub dt_initial: f64,
    /// Steps taken per round; later rounds reuse the last entry
    pub steps: Vec<usize>,
    pub dt_min: f64,
    pub dt_max: f64,
    /// Growth factor after a successful step
    pub grow: f64,
    /// Reduction factor after a failed step
    pub shrink: f64,
    /// Time-stepping rounds before the steady solve is abandoned
    pub max_rounds: usize,
}

impl Default for TimeStepConfig {
    fn default() -> Self {
        Self {
            dt_initial: 1e-5,
            steps: vec![2, 5, 10, 20],
            dt_min: 1e-12,
            dt_max: 1e-2,
            grow: 1.5,
            shrink: 0.5,
            max_rounds: 20,
        }
    }
}

impl TimeStepConfig {
    /// Step count for round `round` (zero-based).
    pub fn steps_for_round(&self, round: usize) -> usize {
        match self.steps.get(round) {
            Some(&n) => n,
            None => self.steps.last().copied().unwrap_or(10),
        }
    }
}

/// Take `n_steps` implicit steps starting at `dt`; returns the next `dt`.
///
/// `solve_transient(x, rdt, x_prev)` must solve the transient system in
/// place. A failed step is undone and retried with a smaller `dt`.
pub fn advance<F>(
    x: &mut [f64],
    n_steps: usize,
    dt: f64,
    config: &TimeStepConfig,
    mut solve_transient: F,
) -> SolverResult<f64>
where
    F: FnMut(&mut [f64], f64, &[f64]) -> SolverResult<()>,
{
    let mut dt = dt;
    let mut taken = 0;
    while taken < n_steps {
        let x_prev = x.to_vec();
        match solve_transient(x, 1.0 / dt, &x_prev) {
            Ok(()) => {
                taken += 1;
                debug!(step = taken, dt, "time step accepted");
                dt = (dt * config.grow).min(config.dt_max);
            }
            Err(err) if err.is_recoverable() => {
                x.copy_from_slice(&x_prev);
                dt *= config.shrink;
                debug!(dt, "time step failed, shrinking: {err}");
                if dt < config.dt_min {
                    return Err(SolverError::ConvergenceFailed {
                        what: format!("time step fell below {:e} s", config.dt_min),
                    });
                }
            }
            Err(err) => return Err(err),
        }
    }
    Ok(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relaxes_toward_steady_state() {
        // dx/dt = 1 - x, implicit Euler
        let mut x = vec![0.0];
        let cfg = TimeStepConfig {
            dt_max: 1.0,
            ..TimeStepConfig::default()
        };
        let dt = advance(&mut x, 20, 0.1, &cfg, |x, rdt, prev| {
            x[0] = (rdt * prev[0] + 1.0) / (rdt + 1.0);
            Ok(())
        })
        .unwrap();
        assert!(x[0] > 0.5 && x[0] < 1.0);
        assert_eq!(dt, cfg.dt_max);
    }

    #[test]
    fn steps_are_clamped_to_dt_max() {
        let mut x = vec![0.0];
        let cfg = TimeStepConfig::default();
        let mut seen = Vec::new();
        advance(&mut x, 5, 0.1, &cfg, |x, rdt, prev| {
            seen.push(1.0 / rdt);
            x[0] = (rdt * prev[0] + 1.0) / (rdt + 1.0);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen.len(), 5);
        assert!((seen[0] - 0.1).abs() < 1e-15);
        assert!(seen[1..].iter().all(|&dt| (dt - cfg.dt_max).abs() < 1e-15));

        let mut expected = 0.0;
        for dt in &seen {
            expected = (expected / dt + 1.0) / (1.0 / dt + 1.0);
        }
        assert!((x[0] - expected).abs() < 1e-14);
    }

    #[test]
    fn failures_shrink_until_limit() {
        let mut x = vec![1.0];
        let cfg = TimeStepConfig::default();
        let err = advance(&mut x, 1, 1e-5, &cfg, |_, _, _| {
            Err(SolverError::ConvergenceFailed { what: "nope".into() })
        })
        .unwrap_err();
        assert!(matches!(err, SolverError::ConvergenceFailed { .. }));
        assert_eq!(x[0], 1.0);
    }

    #[test]
    fn rounds_reuse_last_entry() {
        let cfg = TimeStepConfig::default();
        assert_eq!(cfg.steps_for_round(0), 2);
        assert_eq!(cfg.steps_for_round(3), 20);
        assert_eq!(cfg.steps_for_round(9), 20);
    }
}
