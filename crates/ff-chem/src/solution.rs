//! Bundle of the thermodynamic and kinetic engines for one mechanism.

use crate::composition::Composition;
use crate::error::ChemResult;
use crate::ideal_gas::IdealGasMixture;
use crate::kinetics::ReducedIonKinetics;
use crate::model::{EquationOfState, Kinetics};
use crate::species::Species;

/// Gas phase plus kinetics, shared read-only by every flame built from it.
#[derive(Debug, Clone)]
pub struct Solution {
    gas: IdealGasMixture,
    kinetics: ReducedIonKinetics,
}

impl Solution {
    pub fn new(gas: IdealGasMixture, kinetics: ReducedIonKinetics) -> Self {
        Self { gas, kinetics }
    }

    /// Reduced methane/air mechanism with `H3O+` and electrons.
    pub fn methane_ion() -> Self {
        Self::new(
            IdealGasMixture::new(Species::ALL.to_vec()),
            ReducedIonKinetics::default(),
        )
    }

    pub fn eos(&self) -> &dyn EquationOfState {
        &self.gas
    }

    pub fn kinetics(&self) -> &dyn Kinetics {
        &self.kinetics
    }

    pub fn species(&self) -> &[Species] {
        self.gas.species()
    }

    /// Mole-fraction vector for a fuel/oxidizer blend at equivalence ratio `phi`.
    ///
    /// Compositions use the `"O2:0.21,N2:0.79"` syntax.
    pub fn mixture_for_equivalence_ratio(&self, phi: f64, fuel: &str, oxidizer: &str) -> ChemResult<Vec<f64>> {
        let fuel: Composition = fuel.parse()?;
        let oxidizer: Composition = oxidizer.parse()?;
        Composition::for_equivalence_ratio(phi, &fuel, &oxidizer)?.to_mole_vector(self.species())
    }
}
