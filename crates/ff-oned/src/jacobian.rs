//! Finite-difference Jacobian for banded systems.

use crate::banded::BandMatrix;
use crate::error::{SolverError, SolverResult};

/// Forward-difference Jacobian of `f` at `x` with half-bandwidth `bw`.
///
/// Columns spaced `2·bw + 1` apart touch disjoint rows, so they are perturbed
/// together and each group costs one residual evaluation. The perturbation of
/// column `j` is `rel_step·|x_j| + abs_step[j]`.
pub fn banded_fd_jacobian<F>(
    x: &[f64],
    r0: &[f64],
    bw: usize,
    rel_step: f64,
    abs_step: &[f64],
    mut f: F,
) -> SolverResult<BandMatrix>
where
    F: FnMut(&[f64], &mut [f64]) -> SolverResult<()>,
{
    let n = x.len();
    if r0.len() != n || abs_step.len() != n {
        return Err(SolverError::InvalidState {
            what: "Jacobian inputs have inconsistent lengths".to_string(),
        });
    }
    let stride = 2 * bw + 1;
    let mut jac = BandMatrix::new(n, bw, bw);
    let mut xp = x.to_vec();
    let mut r1 = vec![0.0; n];
    let mut dx = vec![0.0; n];

    for group in 0..stride.min(n) {
        for j in (group..n).step_by(stride) {
            dx[j] = rel_step * x[j].abs() + abs_step[j];
            xp[j] = x[j] + dx[j];
        }
        f(&xp, &mut r1)?;
        for j in (group..n).step_by(stride) {
            let lo = j.saturating_sub(bw);
            let hi = (j + bw + 1).min(n);
            for i in lo..hi {
                jac.set(i, j, (r1[i] - r0[i]) / dx[j]);
            }
            xp[j] = x[j];
        }
    }
    Ok(jac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tridiagonal_quadratic() {
        // f_i = x_{i-1} - 2 x_i^2 + x_{i+1}
        let f = |x: &[f64], out: &mut [f64]| -> SolverResult<()> {
            let n = x.len();
            for i in 0..n {
                let left = if i > 0 { x[i - 1] } else { 0.0 };
                let right = if i + 1 < n { x[i + 1] } else { 0.0 };
                out[i] = left - 2.0 * x[i] * x[i] + right;
            }
            Ok(())
        };
        let x: Vec<f64> = (0..7).map(|i| 1.0 + 0.1 * i as f64).collect();
        let mut r0 = vec![0.0; 7];
        f(&x, &mut r0).unwrap();
        let jac = banded_fd_jacobian(&x, &r0, 1, 1e-7, &[1e-9; 7], f).unwrap();

        for i in 0..7 {
            assert!((jac.get(i, i) + 4.0 * x[i]).abs() < 1e-5);
            if i > 0 {
                assert!((jac.get(i, i - 1) - 1.0).abs() < 1e-5);
            }
            if i + 1 < 7 {
                assert!((jac.get(i, i + 1) - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn length_mismatch_rejected() {
        let f = |_: &[f64], _: &mut [f64]| -> SolverResult<()> { Ok(()) };
        assert!(banded_fd_jacobian(&[1.0, 2.0], &[0.0], 1, 1e-7, &[1e-9; 2], f).is_err());
    }
}
