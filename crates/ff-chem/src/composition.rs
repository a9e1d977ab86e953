//! Gas compositions and the equivalence-ratio mixing rule.

use crate::error::{ChemError, ChemResult};
use crate::species::Species;
use ff_core::numeric::{Tolerances, nearly_equal};
use std::str::FromStr;

/// Gas composition defined by normalized mole fractions.
///
/// The composition is always normalized (mole fractions sum to 1.0).
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Species and their mole fractions (always normalized to sum=1).
    items: Vec<(Species, f64)>,
}

impl Composition {
    /// Create a pure-species composition.
    pub fn pure(species: Species) -> Self {
        Self {
            items: vec![(species, 1.0)],
        }
    }

    /// Create a composition from mole fractions.
    ///
    /// Validates that all fractions are finite, non-negative, and have a positive sum,
    /// then normalizes to sum=1. Repeated species are merged.
    pub fn new_mole_fractions(fractions: Vec<(Species, f64)>) -> ChemResult<Self> {
        if fractions.is_empty() {
            return Err(ChemError::InvalidArg {
                what: "empty composition",
            });
        }

        let mut sum = 0.0;
        for (_, frac) in &fractions {
            if !frac.is_finite() {
                return Err(ChemError::NonPhysical {
                    what: "non-finite mole fraction",
                });
            }
            if *frac < 0.0 {
                return Err(ChemError::NonPhysical {
                    what: "negative mole fraction",
                });
            }
            sum += frac;
        }

        if sum <= 0.0 || !sum.is_finite() {
            return Err(ChemError::NonPhysical {
                what: "mole fractions sum to zero or non-finite",
            });
        }

        let mut items: Vec<(Species, f64)> = Vec::with_capacity(fractions.len());
        for (species, frac) in fractions {
            let frac = frac / sum;
            if frac <= 1e-15 {
                continue;
            }
            match items.iter_mut().find(|(s, _)| *s == species) {
                Some((_, f)) => *f += frac,
                None => items.push((species, frac)),
            }
        }

        if items.is_empty() {
            return Err(ChemError::NonPhysical {
                what: "all mole fractions negligible",
            });
        }

        // renormalize after dropping negligible entries
        let total: f64 = items.iter().map(|(_, f)| f).sum();
        for (_, f) in &mut items {
            *f /= total;
        }

        Ok(Self { items })
    }

    /// Get mole fraction of a species (0.0 if not present).
    pub fn mole_fraction(&self, species: Species) -> f64 {
        self.items
            .iter()
            .find(|(s, _)| *s == species)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    /// Check if this is a pure-species composition.
    pub fn is_pure(&self) -> Option<Species> {
        if self.items.len() == 1 {
            let (species, frac) = self.items[0];
            let tol = Tolerances {
                abs: 1e-10,
                rel: 1e-10,
            };
            if nearly_equal(frac, 1.0, tol) {
                return Some(species);
            }
        }
        None
    }

    /// Iterate over all species with non-zero mole fractions.
    pub fn iter(&self) -> impl Iterator<Item = (Species, f64)> + '_ {
        self.items.iter().copied()
    }

    /// Mixture molar mass [kg/kmol].
    pub fn molar_mass(&self) -> f64 {
        self.items
            .iter()
            .map(|(species, mole_frac)| species.molar_mass() * mole_frac)
            .sum()
    }

    /// Mole-weighted oxygen demand, see [`Species::oxygen_demand`].
    pub fn oxygen_demand(&self) -> f64 {
        self.items
            .iter()
            .map(|(species, x)| species.oxygen_demand() * x)
            .sum()
    }

    /// Dense mole-fraction vector ordered like `species`.
    ///
    /// Fails if the composition holds a species absent from `species`.
    pub fn to_mole_vector(&self, species: &[Species]) -> ChemResult<Vec<f64>> {
        let mut x = vec![0.0; species.len()];
        for (sp, frac) in self.iter() {
            let k = species
                .iter()
                .position(|s| *s == sp)
                .ok_or_else(|| ChemError::UnknownSpecies {
                    name: sp.key().to_string(),
                })?;
            x[k] += frac;
        }
        Ok(x)
    }

    /// Blend a fuel and an oxidizer at equivalence ratio `phi`.
    ///
    /// Uses the oxygen balance: moles of fuel per mole of oxidizer are
    /// `phi · (−o_ox) / o_fuel`, where `o` is the oxygen demand.
    pub fn for_equivalence_ratio(phi: f64, fuel: &Composition, oxidizer: &Composition) -> ChemResult<Self> {
        if !phi.is_finite() || phi <= 0.0 {
            return Err(ChemError::InvalidArg {
                what: "equivalence ratio must be positive and finite",
            });
        }
        let o_fuel = fuel.oxygen_demand();
        let o_ox = oxidizer.oxygen_demand();
        if o_fuel <= 0.0 {
            return Err(ChemError::InvalidArg {
                what: "fuel has no oxygen demand",
            });
        }
        if o_ox >= 0.0 {
            return Err(ChemError::InvalidArg {
                what: "oxidizer supplies no oxygen",
            });
        }
        let fuel_per_ox = phi * (-o_ox) / o_fuel;
        let blend = fuel
            .iter()
            .map(|(s, x)| (s, x * fuel_per_ox))
            .chain(oxidizer.iter())
            .collect();
        Self::new_mole_fractions(blend)
    }
}

impl FromStr for Composition {
    type Err = ChemError;

    /// Parse `"O2:0.21, N2:0.79"`. A bare name such as `"CH4"` is a pure species.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = |reason| ChemError::Parse {
            input: s.to_string(),
            reason,
        };
        let mut items = Vec::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.split_once(':') {
                Some((name, value)) => {
                    let species: Species = name.parse()?;
                    let frac: f64 = value
                        .trim()
                        .parse()
                        .map_err(|_| parse_err("mole fraction is not a number"))?;
                    items.push((species, frac));
                }
                None => items.push((entry.parse::<Species>()?, 1.0)),
            }
        }
        if items.is_empty() {
            return Err(parse_err("no species given"));
        }
        Self::new_mole_fractions(items)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalized_sum_is_one(fracs in prop::collection::vec(0.0_f64..1.0_f64, 1..9)) {
            let composition_input: Vec<(Species, f64)> = fracs
                .iter()
                .enumerate()
                .map(|(i, &f)| (Species::ALL[i % Species::ALL.len()], f))
                .collect();

            if let Ok(comp) = Composition::new_mole_fractions(composition_input) {
                let sum: f64 = comp.iter().map(|(_, f)| f).sum();
                let tol = Tolerances { abs: 1e-9, rel: 1e-9 };
                prop_assert!(nearly_equal(sum, 1.0, tol));
            }
        }

        #[test]
        fn equivalence_ratio_blend_sums_to_one(phi in 0.05_f64..5.0) {
            let fuel: Composition = "CH4".parse().unwrap();
            let air: Composition = "O2:0.21,N2:0.79".parse().unwrap();
            let mix = Composition::for_equivalence_ratio(phi, &fuel, &air).unwrap();
            let sum: f64 = mix.iter().map(|(_, f)| f).sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
    }
}
