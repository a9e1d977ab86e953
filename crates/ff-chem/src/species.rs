//! Chemical species of the reduced ion mechanism.

use crate::error::ChemError;
use std::str::FromStr;

/// Atomic weights [kg/kmol].
const W_C: f64 = 12.011;
const W_H: f64 = 1.008;
const W_O: f64 = 15.999;
const W_N: f64 = 14.007;
const W_ELECTRON: f64 = 5.485_799e-4;

/// Chemical elements tracked for element conservation. `E` counts electrons,
/// so a cation carries `-1` and the free electron `+1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    C,
    H,
    O,
    N,
    E,
}

impl Element {
    pub const ALL: [Element; 5] = [Element::C, Element::H, Element::O, Element::N, Element::E];

    pub fn index(self) -> usize {
        match self {
            Element::C => 0,
            Element::H => 1,
            Element::O => 2,
            Element::N => 3,
            Element::E => 4,
        }
    }
}

/// Species carried by the flame model, in mechanism order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Methane (CH₄)
    CH4,
    /// Oxygen (O₂)
    O2,
    /// Hydrogen (H₂)
    H2,
    /// Water (H₂O)
    H2O,
    /// Carbon monoxide (CO)
    CO,
    /// Carbon dioxide (CO₂)
    CO2,
    /// Nitrogen (N₂)
    N2,
    /// Hydronium (H₃O⁺)
    H3OPlus,
    /// Free electron
    Electron,
}

impl Species {
    pub const ALL: [Species; 9] = [
        Species::CH4,
        Species::O2,
        Species::H2,
        Species::H2O,
        Species::CO,
        Species::CO2,
        Species::N2,
        Species::H3OPlus,
        Species::Electron,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Species::CH4 => "CH4",
            Species::O2 => "O2",
            Species::H2 => "H2",
            Species::H2O => "H2O",
            Species::CO => "CO",
            Species::CO2 => "CO2",
            Species::N2 => "N2",
            Species::H3OPlus => "H3O+",
            Species::Electron => "E",
        }
    }

    /// Atom counts indexed by [`Element::index`].
    pub fn elements(&self) -> [f64; 5] {
        match self {
            Species::CH4 => [1.0, 4.0, 0.0, 0.0, 0.0],
            Species::O2 => [0.0, 0.0, 2.0, 0.0, 0.0],
            Species::H2 => [0.0, 2.0, 0.0, 0.0, 0.0],
            Species::H2O => [0.0, 2.0, 1.0, 0.0, 0.0],
            Species::CO => [1.0, 0.0, 1.0, 0.0, 0.0],
            Species::CO2 => [1.0, 0.0, 2.0, 0.0, 0.0],
            Species::N2 => [0.0, 0.0, 0.0, 2.0, 0.0],
            Species::H3OPlus => [0.0, 3.0, 1.0, 0.0, -1.0],
            Species::Electron => [0.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn atoms(&self, element: Element) -> f64 {
        self.elements()[element.index()]
    }

    /// Charge number (multiples of the elementary charge).
    pub fn charge(&self) -> f64 {
        -self.atoms(Element::E)
    }

    pub fn is_charged(&self) -> bool {
        self.charge() != 0.0
    }

    /// Molar mass [kg/kmol].
    pub fn molar_mass(&self) -> f64 {
        let e = self.elements();
        e[0] * W_C + e[1] * W_H + e[2] * W_O + e[3] * W_N + e[4] * W_ELECTRON
    }

    /// Oxygen demand of one mole: `2·C + H/2 − O`.
    ///
    /// Positive for fuels, negative for oxidizers, zero for inerts and
    /// complete combustion products.
    pub fn oxygen_demand(&self) -> f64 {
        2.0 * self.atoms(Element::C) + 0.5 * self.atoms(Element::H) - self.atoms(Element::O)
    }
}

impl FromStr for Species {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::ALL
            .iter()
            .copied()
            .find(|sp| sp.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ChemError::UnknownSpecies {
                name: s.trim().to_string(),
            })
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
