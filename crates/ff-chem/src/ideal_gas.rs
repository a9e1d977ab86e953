//! Ideal-gas mixture with NASA 7-coefficient thermodynamics.

use crate::equilibrium::{EquilibriumOptions, EquilibriumSolver};
use crate::error::ChemResult;
use crate::model::{EquationOfState, EquilibriumConstraint, GasState, validation};
use crate::species::Species;
use crate::thermo::{Nasa7, nasa7};
use ff_core::units::constants::GAS_CONSTANT;
use ff_core::units::k;

#[derive(Debug, Clone)]
pub struct IdealGasMixture {
    species: Vec<Species>,
    weights: Vec<f64>,
    fits: Vec<Nasa7>,
    equilibrium: EquilibriumOptions,
}

impl IdealGasMixture {
    pub fn new(species: Vec<Species>) -> Self {
        let weights = species.iter().map(|s| s.molar_mass()).collect();
        let fits = species.iter().map(|s| nasa7(*s)).collect();
        Self {
            species,
            weights,
            fits,
            equilibrium: EquilibriumOptions::default(),
        }
    }

    pub fn with_equilibrium_options(mut self, options: EquilibriumOptions) -> Self {
        self.equilibrium = options;
        self
    }

    pub fn fits(&self) -> &[Nasa7] {
        &self.fits
    }

    /// Molar-basis enthalpy [J/kmol] of a mole-fraction vector.
    pub fn enthalpy_mole(&self, t: f64, x: &[f64]) -> f64 {
        x.iter()
            .zip(&self.fits)
            .map(|(xk, fit)| xk * fit.h_rt(t))
            .sum::<f64>()
            * GAS_CONSTANT
            * t
    }
}

impl EquationOfState for IdealGasMixture {
    fn name(&self) -> &str {
        "ideal-gas"
    }

    fn species(&self) -> &[Species] {
        &self.species
    }

    fn molecular_weights(&self) -> &[f64] {
        &self.weights
    }

    fn density(&self, t: f64, p: f64, y: &[f64]) -> f64 {
        p * self.mean_molecular_weight(y) / (GAS_CONSTANT * t)
    }

    fn cp_mass(&self, t: f64, y: &[f64]) -> f64 {
        y.iter()
            .zip(&self.fits)
            .zip(&self.weights)
            .map(|((yk, fit), wk)| yk * fit.cp_r(t) / wk)
            .sum::<f64>()
            * GAS_CONSTANT
    }

    fn enthalpy_mass(&self, t: f64, y: &[f64]) -> f64 {
        y.iter()
            .zip(&self.fits)
            .zip(&self.weights)
            .map(|((yk, fit), wk)| yk * fit.h_rt(t) / wk)
            .sum::<f64>()
            * GAS_CONSTANT
            * t
    }

    fn molar_enthalpies(&self, t: f64, out: &mut [f64]) {
        for (h, fit) in out.iter_mut().zip(&self.fits) {
            *h = fit.h_rt(t) * GAS_CONSTANT * t;
        }
    }

    fn gibbs_rt(&self, t: f64, out: &mut [f64]) {
        for (g, fit) in out.iter_mut().zip(&self.fits) {
            *g = fit.g_rt(t);
        }
    }

    fn mole_to_mass(&self, x: &[f64]) -> Vec<f64> {
        let wmix: f64 = x.iter().zip(&self.weights).map(|(xk, wk)| xk * wk).sum();
        x.iter()
            .zip(&self.weights)
            .map(|(xk, wk)| xk * wk / wmix)
            .collect()
    }

    fn mass_to_mole(&self, y: &[f64]) -> Vec<f64> {
        let wmix = self.mean_molecular_weight(y);
        y.iter()
            .zip(&self.weights)
            .map(|(yk, wk)| yk * wmix / wk)
            .collect()
    }

    fn equilibrate(&self, state: &GasState, constraint: EquilibriumConstraint) -> ChemResult<GasState> {
        let t = validation::validate_temperature(state.temperature.value)?;
        let p = validation::validate_pressure(state.pressure.value)?;
        validation::validate_fractions(&state.x, self.species.len())?;

        let mut solver = EquilibriumSolver::new(self, &state.x, self.equilibrium)?;
        let (t_eq, x_eq) = match constraint {
            EquilibriumConstraint::TP => (t, solver.solve_tp(t, p)?),
            EquilibriumConstraint::HP => {
                let h0 = self.enthalpy_mole(t, &solver.initial_mole_fractions());
                solver.solve_hp(h0, p)?
            }
        };
        Ok(GasState {
            temperature: k(t_eq),
            pressure: state.pressure,
            x: x_eq,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn air_y(gas: &IdealGasMixture) -> Vec<f64> {
        let mut x = vec![0.0; gas.n_species()];
        x[1] = 0.21;
        x[6] = 0.79;
        gas.mole_to_mass(&x)
    }

    #[test]
    fn air_density_at_ambient() {
        let gas = IdealGasMixture::new(Species::ALL.to_vec());
        let rho = gas.density(300.0, 101_325.0, &air_y(&gas));
        assert!((rho - 1.17).abs() < 0.01);
    }

    #[test]
    fn air_cp_is_about_1kj() {
        let gas = IdealGasMixture::new(Species::ALL.to_vec());
        let cp = gas.cp_mass(300.0, &air_y(&gas));
        assert!((cp - 1005.0).abs() < 15.0);
    }

    #[test]
    fn mass_mole_round_trip() {
        let gas = IdealGasMixture::new(Species::ALL.to_vec());
        let y = air_y(&gas);
        let x = gas.mass_to_mole(&y);
        assert!((x[1] - 0.21).abs() < 1e-12);
        assert!((x[6] - 0.79).abs() < 1e-12);
        let sum: f64 = y.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }
}
