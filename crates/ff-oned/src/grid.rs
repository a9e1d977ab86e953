//! Grid construction and checks.

use crate::error::{SolverError, SolverResult};
use ff_core::numeric::is_strictly_increasing;

/// `n` equally spaced points on `[0, length]`.
pub fn uniform_grid(n: usize, length: f64) -> SolverResult<Vec<f64>> {
    if n < 2 {
        return Err(SolverError::ProblemSetup {
            what: format!("a grid needs at least 2 points, got {n}"),
        });
    }
    if !(length.is_finite() && length > 0.0) {
        return Err(SolverError::ProblemSetup {
            what: format!("grid length must be positive, got {length}"),
        });
    }
    let dz = length / (n - 1) as f64;
    let mut z: Vec<f64> = (0..n).map(|i| i as f64 * dz).collect();
    z[n - 1] = length;
    Ok(z)
}

pub fn validate_grid(z: &[f64]) -> SolverResult<()> {
    if z.len() < 2 || !is_strictly_increasing(z) {
        return Err(SolverError::ProblemSetup {
            what: "grid must have at least 2 strictly increasing points".to_string(),
        });
    }
    Ok(())
}

/// Position of `z` relative to the grid's extent, in `[0, 1]` for points
/// inside it.
pub fn normalized_position(grid: &[f64], z: f64) -> f64 {
    match (grid.first(), grid.last()) {
        (Some(&lo), Some(&hi)) if hi > lo => (z - lo) / (hi - lo),
        _ => 0.0,
    }
}
