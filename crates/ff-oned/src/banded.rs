//! Banded matrix with LU factorisation by partial pivoting.
//!
//! Storage follows the LAPACK band layout with room for pivoting fill-in:
//! `A(i, j)` lives at `data[j * ldab + kl + ku + i - j]`.

use crate::error::{SolverError, SolverResult};

#[derive(Debug, Clone)]
pub struct BandMatrix {
    n: usize,
    kl: usize,
    ku: usize,
    ldab: usize,
    data: Vec<f64>,
    ipiv: Vec<usize>,
    factored: bool,
}

impl BandMatrix {
    pub fn new(n: usize, kl: usize, ku: usize) -> Self {
        let ldab = 2 * kl + ku + 1;
        Self {
            n,
            kl,
            ku,
            ldab,
            data: vec![0.0; ldab * n],
            ipiv: vec![0; n],
            factored: false,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n
    }

    pub fn is_factored(&self) -> bool {
        self.factored
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        j * self.ldab + self.kl + self.ku + i - j
    }

    /// Whether `(i, j)` lies inside the original band.
    #[inline]
    pub fn in_band(&self, i: usize, j: usize) -> bool {
        i < self.n && j < self.n && i + self.ku >= j && i <= j + self.kl
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        if self.in_band(i, j) {
            self.data[self.offset(i, j)]
        } else {
            0.0
        }
    }

    /// Set an in-band entry; out-of-band writes are ignored.
    pub fn set(&mut self, i: usize, j: usize, v: f64) {
        debug_assert!(self.in_band(i, j), "({i}, {j}) outside band");
        if self.in_band(i, j) {
            let k = self.offset(i, j);
            self.data[k] = v;
            self.factored = false;
        }
    }

    pub fn zero(&mut self) {
        self.data.iter_mut().for_each(|v| *v = 0.0);
        self.factored = false;
    }

    /// `y = A x` on the unfactored matrix.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        let mut y = vec![0.0; self.n];
        for (i, yi) in y.iter_mut().enumerate() {
            let j0 = i.saturating_sub(self.kl);
            let j1 = (i + self.ku + 1).min(self.n);
            *yi = (j0..j1).map(|j| self.get(i, j) * x[j]).sum();
        }
        y
    }

    /// In-place LU factorisation with partial pivoting.
    pub fn factor(&mut self) -> SolverResult<()> {
        let n = self.n;
        let kv = self.kl + self.ku;
        // clear fill-in rows above the original band
        for j in 0..n {
            for r in 0..self.kl {
                self.data[j * self.ldab + r] = 0.0;
            }
        }

        let mut ju = 0;
        for j in 0..n {
            let km = self.kl.min(n - 1 - j);
            let mut jp = 0;
            let mut pmax = self.data[j * self.ldab + kv].abs();
            for p in 1..=km {
                let v = self.data[j * self.ldab + kv + p].abs();
                if v > pmax {
                    pmax = v;
                    jp = p;
                }
            }
            self.ipiv[j] = j + jp;
            if pmax == 0.0 || !pmax.is_finite() {
                return Err(SolverError::Numeric {
                    what: format!("Jacobian is singular at column {j}"),
                });
            }

            ju = ju.max((j + self.ku + jp).min(n - 1));
            if jp != 0 {
                for c in j..=ju {
                    let a = self.offset(j, c);
                    let b = self.offset(j + jp, c);
                    self.data.swap(a, b);
                }
            }
            if km > 0 {
                let pivot = self.data[self.offset(j, j)];
                for r in 1..=km {
                    let k = self.offset(j + r, j);
                    self.data[k] /= pivot;
                }
                for c in (j + 1)..=ju {
                    let ajc = self.data[self.offset(j, c)];
                    if ajc != 0.0 {
                        for r in 1..=km {
                            let l = self.data[self.offset(j + r, j)];
                            let k = self.offset(j + r, c);
                            self.data[k] -= l * ajc;
                        }
                    }
                }
            }
        }
        self.factored = true;
        Ok(())
    }

    /// Solve `A x = b` in place using the stored factorisation.
    pub fn solve(&self, b: &mut [f64]) -> SolverResult<()> {
        if !self.factored {
            return Err(SolverError::InvalidState {
                what: "band matrix solve before factorisation".to_string(),
            });
        }
        if b.len() != self.n {
            return Err(SolverError::InvalidState {
                what: format!("right-hand side has {} rows, expected {}", b.len(), self.n),
            });
        }
        let n = self.n;
        let kv = self.kl + self.ku;

        // L y = P b
        if self.kl > 0 {
            for j in 0..n.saturating_sub(1) {
                let lm = self.kl.min(n - 1 - j);
                let l = self.ipiv[j];
                if l != j {
                    b.swap(l, j);
                }
                let bj = b[j];
                for r in 1..=lm {
                    b[j + r] -= self.data[self.offset(j + r, j)] * bj;
                }
            }
        }

        // U x = y
        for j in (0..n).rev() {
            b[j] /= self.data[self.offset(j, j)];
            let bj = b[j];
            for i in j.saturating_sub(kv)..j {
                b[i] -= self.data[self.offset(i, j)] * bj;
            }
        }
        Ok(())
    }
}
