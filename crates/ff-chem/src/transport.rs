//! Lewis-number transport with ion and electron mobilities.

use crate::error::{ChemError, ChemResult};
use crate::model::TransportModel;
use crate::species::Species;
use ff_core::units::constants::{BOLTZMANN, ELEMENTARY_CHARGE};
use std::str::FromStr;

/// `λ/cp` at 298 K [kg/(m·s)].
const LAMBDA_OVER_CP_298: f64 = 2.58e-5;
const ELECTRON_MOBILITY: f64 = 0.4;

/// Available transport models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Mixture-averaged neutrals plus charged-species mobilities.
    Ion,
    /// Mixture-averaged neutrals only; charged species diffuse but do not drift.
    Mix,
}

impl FromStr for TransportKind {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Ion" | "ion" => Ok(TransportKind::Ion),
            "Mix" | "mix" | "Mixture" => Ok(TransportKind::Mix),
            _ => Err(ChemError::InvalidArg {
                what: "unknown transport model",
            }),
        }
    }
}

/// Transport model built on constant Lewis numbers.
#[derive(Debug, Clone)]
pub struct LewisTransport {
    kind: TransportKind,
    species: Vec<Species>,
    lewis: Vec<f64>,
}

/// Unity-order Lewis numbers for the reduced mechanism.
pub fn lewis_number(species: Species) -> f64 {
    match species {
        Species::CH4 => 0.97,
        Species::O2 => 1.11,
        Species::H2 => 0.3,
        Species::H2O => 0.83,
        Species::CO => 1.1,
        Species::CO2 => 1.39,
        Species::N2 => 1.0,
        Species::H3OPlus => 1.0,
        Species::Electron => 1.0,
    }
}

impl LewisTransport {
    pub fn new(kind: TransportKind, species: &[Species]) -> Self {
        Self {
            kind,
            species: species.to_vec(),
            lewis: species.iter().map(|s| lewis_number(*s)).collect(),
        }
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }
}

impl TransportModel for LewisTransport {
    fn name(&self) -> &str {
        match self.kind {
            TransportKind::Ion => "Ion",
            TransportKind::Mix => "Mix",
        }
    }

    fn thermal_conductivity(&self, t: f64, cp_mass: f64) -> f64 {
        cp_mass * LAMBDA_OVER_CP_298 * (t / 298.0).powf(0.7)
    }

    fn mix_diff_coeffs(&self, t: f64, rho: f64, cp_mass: f64, out: &mut [f64]) {
        let lambda = self.thermal_conductivity(t, cp_mass);
        for ((d, sp), le) in out.iter_mut().zip(&self.species).zip(&self.lewis) {
            *d = if *sp == Species::Electron && self.kind == TransportKind::Ion {
                // Einstein relation D = μ k T / e
                ELECTRON_MOBILITY * BOLTZMANN * t / ELEMENTARY_CHARGE
            } else {
                lambda / (rho * cp_mass * le)
            };
        }
    }

    fn mobilities(&self, t: f64, rho: f64, cp_mass: f64, out: &mut [f64]) {
        out.iter_mut().for_each(|m| *m = 0.0);
        if self.kind == TransportKind::Mix {
            return;
        }
        let lambda = self.thermal_conductivity(t, cp_mass);
        for ((m, sp), le) in out.iter_mut().zip(&self.species).zip(&self.lewis) {
            if *sp == Species::Electron {
                *m = ELECTRON_MOBILITY;
            } else if sp.is_charged() {
                let d = lambda / (rho * cp_mass * le);
                *m = d * sp.charge().abs() * ELEMENTARY_CHARGE / (BOLTZMANN * t);
            }
        }
    }
}

/// Build a transport model by name (`"Ion"` or `"Mix"`).
pub fn new_transport(name: &str, species: &[Species]) -> ChemResult<Box<dyn TransportModel>> {
    let kind: TransportKind = name.parse()?;
    Ok(Box::new(LewisTransport::new(kind, species)))
}
