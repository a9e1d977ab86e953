//! Gibbs-minimisation equilibrium by the element-potential method.
//!
//! Unknowns per iteration are the reduced element potentials `π_i` and the
//! correction to the log of total moles; species corrections follow from
//! them. Charged species are excluded and come back with zero fraction.

use crate::error::{ChemError, ChemResult};
use crate::ideal_gas::IdealGasMixture;
use crate::model::EquationOfState;
use crate::species::Element;
use ff_core::units::constants::P_REF;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, trace};

/// `ln(1e-8)`: species below this relative size are "trace".
const LN_TRACE: f64 = -18.420_681;
/// `-ln(1e-4)`: trace species are not allowed to grow past this in one step.
const LN_TRACE_STEP: f64 = 9.210_340_4;
const LN_FLOOR: f64 = -500.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquilibriumOptions {
    /// Maximum element-potential iterations per temperature.
    pub max_iterations: usize,
    /// Convergence threshold on mole-weighted log corrections.
    pub tolerance: f64,
    /// Temperature bracket for the HP search [K].
    pub t_min: f64,
    pub t_max: f64,
    /// Maximum temperature iterations for HP.
    pub max_t_iterations: usize,
}

impl Default for EquilibriumOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 0.5e-5,
            t_min: 250.0,
            t_max: 6000.0,
            max_t_iterations: 100,
        }
    }
}

pub(crate) struct EquilibriumSolver<'a> {
    gas: &'a IdealGasMixture,
    /// Mechanism indices of the species taking part.
    active: Vec<usize>,
    /// Atom matrix restricted to active species and present elements.
    a: DMatrix<f64>,
    /// Element totals per kmol of initial mixture.
    b0: DVector<f64>,
    x0: Vec<f64>,
    ln_nj: Vec<f64>,
    ln_n: f64,
    options: EquilibriumOptions,
}

impl<'a> EquilibriumSolver<'a> {
    pub(crate) fn new(gas: &'a IdealGasMixture, x: &[f64], options: EquilibriumOptions) -> ChemResult<Self> {
        let species = gas.species();
        let neutral: Vec<usize> = (0..species.len())
            .filter(|&k| !species[k].is_charged())
            .collect();

        let neutral_sum: f64 = neutral.iter().map(|&k| x[k]).sum();
        if neutral_sum <= 0.0 {
            return Err(ChemError::InvalidArg {
                what: "equilibrium needs a neutral species",
            });
        }
        let mut x0 = vec![0.0; species.len()];
        for &k in &neutral {
            x0[k] = x[k] / neutral_sum;
        }

        // elements with zero abundance are dropped, and so is every species
        // that needs one of them
        let elements: Vec<Element> = Element::ALL
            .iter()
            .copied()
            .filter(|&e| e != Element::E)
            .filter(|&e| neutral.iter().map(|&k| species[k].atoms(e) * x0[k]).sum::<f64>() > 1e-12)
            .collect();
        let active: Vec<usize> = neutral
            .into_iter()
            .filter(|&k| {
                Element::ALL
                    .iter()
                    .all(|&e| species[k].atoms(e) == 0.0 || elements.contains(&e))
            })
            .collect();

        let a = DMatrix::from_fn(elements.len(), active.len(), |i, j| {
            species[active[j]].atoms(elements[i])
        });
        let b0 = DVector::from_fn(elements.len(), |i, _| {
            active
                .iter()
                .map(|&k| species[k].atoms(elements[i]) * x0[k])
                .sum()
        });

        let mut solver = Self {
            gas,
            active,
            a,
            b0,
            x0,
            ln_nj: Vec::new(),
            ln_n: 0.0,
            options,
        };
        solver.cold_start();
        Ok(solver)
    }

    pub(crate) fn initial_mole_fractions(&self) -> Vec<f64> {
        self.x0.clone()
    }

    fn cold_start(&mut self) {
        let ns = self.active.len() as f64;
        self.ln_n = 0.1_f64.ln();
        self.ln_nj = vec![(0.1 / ns).ln(); self.active.len()];
    }

    /// Equilibrium mole fractions at fixed `t`, `p`.
    pub(crate) fn solve_tp(&mut self, t: f64, p: f64) -> ChemResult<Vec<f64>> {
        match self.iterate(t, p) {
            Ok(()) => Ok(self.mole_fractions()),
            Err(err) => {
                debug!(t, "equilibrium warm start failed, retrying cold: {err}");
                self.cold_start();
                self.iterate(t, p)?;
                Ok(self.mole_fractions())
            }
        }
    }

    /// Adiabatic equilibrium for molar enthalpy `h0` [J/kmol of initial mixture].
    ///
    /// Regula falsi (Illinois variant) on temperature.
    pub(crate) fn solve_hp(&mut self, h0: f64, p: f64) -> ChemResult<(f64, Vec<f64>)> {
        let mut a = self.options.t_min;
        let mut b = self.options.t_max;
        let mut fa = self.enthalpy_residual(a, p, h0)?;
        let mut fb = self.enthalpy_residual(b, p, h0)?;
        if fa * fb > 0.0 {
            return Err(ChemError::ConvergenceFailed {
                what: "adiabatic temperature outside search bracket",
            });
        }

        let mut t_prev = b;
        for iter in 0..self.options.max_t_iterations {
            let c = (a * fb - b * fa) / (fb - fa);
            let fc = self.enthalpy_residual(c, p, h0)?;
            trace!(iter, t = c, residual = fc, "hp iteration");
            if fc == 0.0 || (c - t_prev).abs() < 1e-7 * c {
                return Ok((c, self.mole_fractions()));
            }
            if fc * fb < 0.0 {
                a = b;
                fa = fb;
            } else {
                fa *= 0.5;
            }
            b = c;
            fb = fc;
            t_prev = c;
        }
        Err(ChemError::ConvergenceFailed {
            what: "adiabatic temperature iteration",
        })
    }

    fn enthalpy_residual(&mut self, t: f64, p: f64, h0: f64) -> ChemResult<f64> {
        let x = self.solve_tp(t, p)?;
        Ok(self.total_moles() * self.gas.enthalpy_mole(t, &x) - h0)
    }

    /// Total moles per kmol of initial mixture.
    fn total_moles(&self) -> f64 {
        self.ln_nj.iter().map(|l| l.exp()).sum()
    }

    fn mole_fractions(&self) -> Vec<f64> {
        let mut x = vec![0.0; self.gas.n_species()];
        let total = self.total_moles();
        for (j, &k) in self.active.iter().enumerate() {
            x[k] = self.ln_nj[j].exp() / total;
        }
        x
    }

    fn iterate(&mut self, t: f64, p: f64) -> ChemResult<()> {
        let ne = self.a.nrows();
        let ns = self.active.len();
        let mut g_all = vec![0.0; self.gas.n_species()];
        self.gas.gibbs_rt(t, &mut g_all);
        let g: Vec<f64> = self.active.iter().map(|&k| g_all[k]).collect();
        let ln_p = (p / P_REF).ln();

        for iter in 0..self.options.max_iterations {
            let n = self.ln_n.exp();
            let nj: Vec<f64> = self.ln_nj.iter().map(|l| l.exp()).collect();
            let sum_nj: f64 = nj.iter().sum();
            let mu: Vec<f64> = (0..ns)
                .map(|j| g[j] + self.ln_nj[j] - self.ln_n + ln_p)
                .collect();

            let mut lhs = DMatrix::<f64>::zeros(ne + 1, ne + 1);
            let mut rhs = DVector::<f64>::zeros(ne + 1);
            for k in 0..ne {
                let mut b_k = 0.0;
                let mut amu = 0.0;
                for j in 0..ns {
                    b_k += self.a[(k, j)] * nj[j];
                    amu += self.a[(k, j)] * nj[j] * mu[j];
                }
                for i in 0..ne {
                    lhs[(k, i)] = (0..ns).map(|j| self.a[(k, j)] * self.a[(i, j)] * nj[j]).sum();
                }
                lhs[(k, ne)] = b_k;
                lhs[(ne, k)] = b_k;
                rhs[k] = self.b0[k] - b_k + amu;
            }
            lhs[(ne, ne)] = sum_nj - n;
            rhs[ne] = n - sum_nj + (0..ns).map(|j| nj[j] * mu[j]).sum::<f64>();

            let sol = lhs.lu().solve(&rhs).ok_or(ChemError::Singular {
                what: "element-potential equations",
            })?;
            let dln_n = sol[ne];
            let dln_nj: Vec<f64> = (0..ns)
                .map(|j| {
                    let pi_a: f64 = (0..ne).map(|i| self.a[(i, j)] * sol[i]).sum();
                    -mu[j] + pi_a + dln_n
                })
                .collect();
            if dln_nj.iter().any(|d| !d.is_finite()) || !dln_n.is_finite() {
                return Err(ChemError::ConvergenceFailed {
                    what: "equilibrium corrections are not finite",
                });
            }

            let converged = (0..ns).all(|j| nj[j] * dln_nj[j].abs() / sum_nj <= self.options.tolerance)
                && n * dln_n.abs() / sum_nj <= self.options.tolerance;

            let lambda = self.damping(&dln_nj, dln_n);
            for j in 0..ns {
                self.ln_nj[j] = (self.ln_nj[j] + lambda * dln_nj[j]).max(LN_FLOOR);
            }
            self.ln_n += lambda * dln_n;

            if converged {
                trace!(iter, t, "equilibrium converged");
                return Ok(());
            }
        }
        Err(ChemError::ConvergenceFailed {
            what: "element-potential iteration",
        })
    }

    fn damping(&self, dln_nj: &[f64], dln_n: f64) -> f64 {
        let mut big = 5.0 * dln_n.abs();
        let mut lambda2 = 1.0_f64;
        for (j, &d) in dln_nj.iter().enumerate() {
            let rel = self.ln_nj[j] - self.ln_n;
            if rel > LN_TRACE {
                if d > 0.0 {
                    big = big.max(d);
                }
            } else if d >= 0.0 {
                let denom = d - dln_n;
                if denom > 1e-30 {
                    lambda2 = lambda2.min(((-rel - LN_TRACE_STEP) / denom).abs());
                }
            }
        }
        let lambda1 = if big > 2.0 { 2.0 / big } else { 1.0 };
        lambda1.min(lambda2).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;

    fn methane_air(phi: f64) -> Vec<f64> {
        let fuel_per_ox = phi * 0.42 / 4.0;
        let total = 1.0 + fuel_per_ox;
        let mut x = vec![0.0; Species::ALL.len()];
        x[0] = fuel_per_ox / total;
        x[1] = 0.21 / total;
        x[6] = 0.79 / total;
        x
    }

    #[test]
    fn tp_equilibrium_conserves_elements() {
        let gas = IdealGasMixture::new(Species::ALL.to_vec());
        let x0 = methane_air(1.0);
        let mut solver = EquilibriumSolver::new(&gas, &x0, EquilibriumOptions::default()).unwrap();
        let x = solver.solve_tp(2000.0, 101_325.0).unwrap();

        let n = solver.total_moles();
        for e in [Element::C, Element::H, Element::O, Element::N] {
            let before: f64 = Species::ALL.iter().zip(&x0).map(|(s, xi)| s.atoms(e) * xi).sum();
            let after: f64 = Species::ALL.iter().zip(&x).map(|(s, xi)| s.atoms(e) * xi * n).sum();
            assert!((before - after).abs() < 1e-5, "{e:?}: {before} vs {after}");
        }
        assert_eq!(x[7], 0.0);
        assert_eq!(x[8], 0.0);
    }

    #[test]
    fn low_temperature_favours_complete_products() {
        let gas = IdealGasMixture::new(Species::ALL.to_vec());
        let x0 = methane_air(0.8);
        let mut solver = EquilibriumSolver::new(&gas, &x0, EquilibriumOptions::default()).unwrap();
        let x = solver.solve_tp(1000.0, 101_325.0).unwrap();
        assert!(x[0] < 1e-10, "CH4 left: {}", x[0]);
        assert!(x[4] < 1e-6, "CO left: {}", x[4]);
        assert!(x[5] > 0.05);
        assert!(x[3] > 0.1);
    }

    #[test]
    fn missing_elements_are_dropped() {
        let gas = IdealGasMixture::new(Species::ALL.to_vec());
        let mut x0 = vec![0.0; Species::ALL.len()];
        x0[1] = 1.0;
        let solver = EquilibriumSolver::new(&gas, &x0, EquilibriumOptions::default()).unwrap();
        assert_eq!(solver.a.nrows(), 1);
    }

    #[test]
    fn rejects_ion_only_mixture() {
        let gas = IdealGasMixture::new(Species::ALL.to_vec());
        let mut x0 = vec![0.0; Species::ALL.len()];
        x0[7] = 0.5;
        x0[8] = 0.5;
        assert!(EquilibriumSolver::new(&gas, &x0, EquilibriumOptions::default()).is_err());
    }
}
