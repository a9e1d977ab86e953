//! Inflow and adiabatic-equilibrium states for one equivalence ratio.

use crate::context::RunContext;
use crate::error::FlameResult;
use ff_chem::{ChemError, EquilibriumConstraint, GasState};
use ff_core::units::{Density, Pressure, Temperature, Velocity, k, kgpm3, mps, pa};
use tracing::info;

/// Unburned and burned states of the premixed gas.
#[derive(Debug, Clone, PartialEq)]
pub struct MixtureState {
    pub phi: f64,
    pub temperature: Temperature,
    pub pressure: Pressure,
    pub inlet_velocity: Velocity,
    /// Unburned mole fractions, mechanism order.
    pub x: Vec<f64>,
    pub y_unburned: Vec<f64>,
    pub y_burned: Vec<f64>,
    pub rho_in: Density,
    pub t_adiabatic: Temperature,
    pub rho_burned: Density,
}

impl MixtureState {
    /// Blend fuel and oxidizer at `phi`, then equilibrate at constant
    /// enthalpy and pressure.
    pub fn initialize(ctx: &RunContext, phi: f64) -> FlameResult<Self> {
        if !(phi.is_finite() && phi > 0.0) {
            return Err(ChemError::InvalidArg {
                what: "equivalence ratio must be positive and finite",
            }
            .into());
        }
        let cfg = &ctx.config().mixture;
        let eos = ctx.eos();

        let x = ctx
            .solution()
            .mixture_for_equivalence_ratio(phi, &cfg.fuel, &cfg.oxidizer)?;
        let y_unburned = eos.mole_to_mass(&x);
        let rho_in = eos.density(cfg.temperature_k, cfg.pressure_pa, &y_unburned);

        let unburned = GasState {
            temperature: k(cfg.temperature_k),
            pressure: pa(cfg.pressure_pa),
            x: x.clone(),
        };
        let burned = eos.equilibrate(&unburned, EquilibriumConstraint::HP)?;
        let t_ad = burned.temperature.value;
        let y_burned = eos.mole_to_mass(&burned.x);
        let rho_burned = eos.density(t_ad, cfg.pressure_pa, &y_burned);

        info!(phi, t_adiabatic = t_ad, rho_in, "mixture initialized");

        Ok(Self {
            phi,
            temperature: k(cfg.temperature_k),
            pressure: pa(cfg.pressure_pa),
            inlet_velocity: mps(cfg.inlet_velocity_mps),
            x,
            y_unburned,
            y_burned,
            rho_in: kgpm3(rho_in),
            t_adiabatic: k(t_ad),
            rho_burned: kgpm3(rho_burned),
        })
    }

    /// Inlet mass flux `u_in · ρ_in` [kg/m²/s].
    pub fn mass_flux(&self) -> f64 {
        self.inlet_velocity.value * self.rho_in.value
    }

    /// Velocity of the burned gas from mass conservation.
    pub fn burned_velocity(&self) -> Velocity {
        mps(self.mass_flux() / self.rho_burned.value)
    }

    /// Temperature halfway between inflow and adiabatic.
    pub fn t_mid(&self) -> f64 {
        0.5 * (self.temperature.value + self.t_adiabatic.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use proptest::prelude::*;

    fn ctx() -> RunContext {
        RunContext::new(RunConfig::default()).unwrap()
    }

    #[test]
    fn stoichiometric_methane_air() {
        let m = MixtureState::initialize(&ctx(), 1.0).unwrap();
        let ch4 = ctx().eos().species_index("CH4").unwrap();
        assert!((m.x[ch4] - 1.0 / 10.52).abs() < 1e-3);
        assert!(m.t_adiabatic.value > 2000.0 && m.t_adiabatic.value < 2400.0);
        assert!(m.rho_burned.value < m.rho_in.value);
        assert!(m.burned_velocity().value > m.inlet_velocity.value);
        assert!((m.t_mid() - 0.5 * (300.0 + m.t_adiabatic.value)).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_phi() {
        let c = ctx();
        for phi in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                MixtureState::initialize(&c, phi),
                Err(crate::FlameError::Chemistry(ChemError::InvalidArg { .. }))
            ));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]
        #[test]
        fn fractions_sum_to_one(phi in 0.4f64..2.0) {
            let m = MixtureState::initialize(&ctx(), phi).unwrap();
            prop_assert!((m.x.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            prop_assert!((m.y_unburned.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            prop_assert!((m.y_burned.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            prop_assert!(m.x.iter().all(|v| *v >= 0.0));
        }
    }
}
