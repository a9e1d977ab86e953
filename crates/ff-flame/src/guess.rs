//! Piecewise-linear starting profiles between the unburned and burned states.

use crate::error::{FlameError, FlameResult};
use crate::mixture::MixtureState;
use crate::solver::NonlinearBvpSolver;

#[derive(Debug, Clone, PartialEq)]
pub struct InitialGuess {
    /// Relative positions of the knots in `[0, 1]`
    pub locations: Vec<f64>,
    /// `(component, value at each knot)`
    pub profiles: Vec<(String, Vec<f64>)>,
}

impl InitialGuess {
    /// Unburned values at the first two knots, burned values at the last two.
    pub fn from_mixture(mixture: &MixtureState, species: &[&str], locations: &[f64]) -> FlameResult<Self> {
        if locations.len() != 4 {
            return Err(FlameError::config(format!(
                "initial guess needs 4 locations, got {}",
                locations.len()
            )));
        }
        if species.len() != mixture.y_unburned.len() {
            return Err(FlameError::contract("species names do not match the mixture"));
        }
        let step = |a: f64, b: f64| vec![a, a, b, b];

        let mut profiles = vec![
            (
                "velocity".to_string(),
                step(mixture.inlet_velocity.value, mixture.burned_velocity().value),
            ),
            (
                "T".to_string(),
                step(mixture.temperature.value, mixture.t_adiabatic.value),
            ),
        ];
        for (k, name) in species.iter().enumerate() {
            profiles.push((
                name.to_string(),
                step(mixture.y_unburned[k], mixture.y_burned[k]),
            ));
        }
        Ok(Self {
            locations: locations.to_vec(),
            profiles,
        })
    }

    pub fn profile(&self, component: &str) -> Option<&[f64]> {
        self.profiles
            .iter()
            .find(|(name, _)| name == component)
            .map(|(_, v)| v.as_slice())
    }

    pub fn apply<S: NonlinearBvpSolver + ?Sized>(&self, solver: &mut S) -> FlameResult<()> {
        for (name, vals) in &self.profiles {
            solver.set_initial_guess(name, &self.locations, vals)?;
        }
        Ok(())
    }
}
