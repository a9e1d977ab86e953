//! Engine traits consumed by the flame model.
//!
//! Property methods take plain SI `f64` arguments (K, Pa, mass fractions)
//! because they sit on the residual hot path; state-level APIs use the
//! `uom` types from `ff_core::units`.

use crate::error::{ChemError, ChemResult};
use crate::species::Species;
use ff_core::units::{Pressure, Temperature};

/// Thermodynamic state of a gas mixture given by mole fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct GasState {
    pub temperature: Temperature,
    pub pressure: Pressure,
    /// Mole fractions in mechanism order.
    pub x: Vec<f64>,
}

/// Property held fixed during an equilibrium calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquilibriumConstraint {
    /// Temperature and pressure.
    TP,
    /// Enthalpy and pressure (adiabatic).
    HP,
}

/// Ideal-gas equation of state plus the thermochemistry the flame needs.
///
/// Implementations must be thread-safe (Send + Sync) so independent cases
/// can share one engine.
pub trait EquationOfState: Send + Sync {
    /// Model name (for logging).
    fn name(&self) -> &str;

    /// Species in mechanism order.
    fn species(&self) -> &[Species];

    fn n_species(&self) -> usize {
        self.species().len()
    }

    fn species_names(&self) -> Vec<&'static str> {
        self.species().iter().map(|s| s.key()).collect()
    }

    fn species_index(&self, name: &str) -> Option<usize> {
        self.species().iter().position(|s| s.key() == name)
    }

    /// Molar masses [kg/kmol] in mechanism order.
    fn molecular_weights(&self) -> &[f64];

    /// Mean molar mass [kg/kmol] from mass fractions.
    fn mean_molecular_weight(&self, y: &[f64]) -> f64 {
        let inv: f64 = y
            .iter()
            .zip(self.molecular_weights())
            .map(|(yk, wk)| yk / wk)
            .sum();
        1.0 / inv
    }

    /// Density [kg/m³].
    fn density(&self, t: f64, p: f64, y: &[f64]) -> f64;

    /// Mass-specific heat capacity [J/(kg·K)].
    fn cp_mass(&self, t: f64, y: &[f64]) -> f64;

    /// Mass-specific enthalpy [J/kg].
    fn enthalpy_mass(&self, t: f64, y: &[f64]) -> f64;

    /// Species molar enthalpies [J/kmol].
    fn molar_enthalpies(&self, t: f64, out: &mut [f64]);

    /// Species standard-state Gibbs energies `g°/(RT)`.
    fn gibbs_rt(&self, t: f64, out: &mut [f64]);

    fn mole_to_mass(&self, x: &[f64]) -> Vec<f64>;

    fn mass_to_mole(&self, y: &[f64]) -> Vec<f64>;

    /// Chemical equilibrium from `state` holding `constraint` fixed.
    fn equilibrate(&self, state: &GasState, constraint: EquilibriumConstraint) -> ChemResult<GasState>;
}

/// Homogeneous gas-phase kinetics.
pub trait Kinetics: Send + Sync {
    fn n_reactions(&self) -> usize;

    /// Net molar production rates [kmol/(m³·s)] in mechanism order.
    fn net_production_rates(&self, t: f64, p: f64, y: &[f64], wdot: &mut [f64]);
}

/// Transport properties for the flow residual.
pub trait TransportModel: Send + Sync {
    fn name(&self) -> &str;

    /// Thermal conductivity [W/(m·K)].
    fn thermal_conductivity(&self, t: f64, cp_mass: f64) -> f64;

    /// Mixture-averaged diffusion coefficients [m²/s].
    fn mix_diff_coeffs(&self, t: f64, rho: f64, cp_mass: f64, out: &mut [f64]);

    /// Species mobilities [m²/(V·s)], magnitude only; zero for neutrals.
    fn mobilities(&self, t: f64, rho: f64, cp_mass: f64, out: &mut [f64]);
}

/// Validation helpers shared by the engines.
pub mod validation {
    use super::*;

    pub fn validate_temperature(t: f64) -> ChemResult<f64> {
        if !t.is_finite() || t <= 0.0 {
            return Err(ChemError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        Ok(t)
    }

    pub fn validate_pressure(p: f64) -> ChemResult<f64> {
        if !p.is_finite() || p <= 0.0 {
            return Err(ChemError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        Ok(p)
    }

    /// Fractions must be finite, non-negative and sum to one within `1e-9`.
    pub fn validate_fractions(v: &[f64], expected_len: usize) -> ChemResult<()> {
        if v.len() != expected_len {
            return Err(ChemError::InvalidArg {
                what: "fraction vector length does not match species count",
            });
        }
        if v.iter().any(|f| !f.is_finite() || *f < 0.0) {
            return Err(ChemError::NonPhysical {
                what: "fractions must be finite and non-negative",
            });
        }
        let sum: f64 = v.iter().sum();
        if (sum - 1.0).abs() > 1e-9 {
            return Err(ChemError::NonPhysical {
                what: "fractions do not sum to one",
            });
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn rejects_bad_states() {
            assert!(validate_temperature(-1.0).is_err());
            assert!(validate_temperature(f64::NAN).is_err());
            assert!(validate_pressure(0.0).is_err());
            assert!(validate_fractions(&[0.5, 0.4], 2).is_err());
            assert!(validate_fractions(&[0.5, 0.5], 3).is_err());
            assert!(validate_fractions(&[1.5, -0.5], 2).is_err());
            assert!(validate_fractions(&[0.25, 0.75], 2).is_ok());
        }
    }
}
