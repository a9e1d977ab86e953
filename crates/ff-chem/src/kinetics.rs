//! Reduced methane mechanism with chemi-ionisation.
//!
//! Two global oxidation steps carry the heat release. A fixed fraction of the
//! fuel-consumption rate produces `H3O+` and a free electron, which are
//! removed by dissociative recombination.

use crate::model::Kinetics;
use crate::species::Species;
use crate::thermo::{Nasa7, nasa7};
use ff_core::units::constants::{GAS_CONSTANT, P_REF};

/// Modified Arrhenius coefficients in SI (kmol, m³, s, J/kmol).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrhenius {
    pub a: f64,
    pub b: f64,
    pub ea: f64,
}

impl Arrhenius {
    pub fn rate(&self, t: f64) -> f64 {
        self.a * t.powf(self.b) * (-self.ea / (GAS_CONSTANT * t)).exp()
    }
}

/// Rate parameters of the reduced ion mechanism.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IonMechanismParams {
    /// CH4 + 1.5 O2 => CO + 2 H2O
    pub fuel_oxidation: Arrhenius,
    /// Reaction orders in CH4 and O2 for the fuel step.
    pub fuel_orders: (f64, f64),
    /// CO + 0.5 O2 <=> CO2
    pub co_oxidation: Arrhenius,
    /// Chemi-ionisation yield per fuel-oxidation event.
    pub ionization_yield: f64,
    /// H3O+ + E => H2O + 0.5 H2
    pub recombination: Arrhenius,
}

impl Default for IonMechanismParams {
    fn default() -> Self {
        Self {
            fuel_oxidation: Arrhenius {
                a: 2.0e12,
                b: 0.0,
                ea: 1.4644e8,
            },
            fuel_orders: (0.9, 1.1),
            co_oxidation: Arrhenius {
                a: 6.325e7,
                b: 0.0,
                ea: 5.0208e7,
            },
            ionization_yield: 1.0e-7,
            recombination: Arrhenius {
                a: 2.29e15,
                b: -0.5,
                ea: 0.0,
            },
        }
    }
}

const CH4: usize = 0;
const O2: usize = 1;
const H2: usize = 2;
const H2O: usize = 3;
const CO: usize = 4;
const CO2: usize = 5;
const H3O: usize = 7;
const E: usize = 8;

/// Kinetics over [`Species::ALL`] in mechanism order.
#[derive(Debug, Clone)]
pub struct ReducedIonKinetics {
    params: IonMechanismParams,
    weights: [f64; 9],
    fit_co: Nasa7,
    fit_o2: Nasa7,
    fit_co2: Nasa7,
}

impl ReducedIonKinetics {
    pub fn new(params: IonMechanismParams) -> Self {
        let mut weights = [0.0; 9];
        for (w, s) in weights.iter_mut().zip(Species::ALL) {
            *w = s.molar_mass();
        }
        Self {
            params,
            weights,
            fit_co: nasa7(Species::CO),
            fit_o2: nasa7(Species::O2),
            fit_co2: nasa7(Species::CO2),
        }
    }

    pub fn species(&self) -> &'static [Species] {
        &Species::ALL
    }

    /// Concentration-based equilibrium constant of CO + 0.5 O2 <=> CO2.
    fn kc_co_oxidation(&self, t: f64) -> f64 {
        let dg = self.fit_co2.g_rt(t) - self.fit_co.g_rt(t) - 0.5 * self.fit_o2.g_rt(t);
        // Δν = -0.5
        (-dg).exp() * (P_REF / (GAS_CONSTANT * t)).powf(-0.5)
    }
}

impl Default for ReducedIonKinetics {
    fn default() -> Self {
        Self::new(IonMechanismParams::default())
    }
}

impl Kinetics for ReducedIonKinetics {
    fn n_reactions(&self) -> usize {
        4
    }

    fn net_production_rates(&self, t: f64, p: f64, y: &[f64], wdot: &mut [f64]) {
        let inv_w: f64 = y.iter().zip(&self.weights).map(|(yk, wk)| yk / wk).sum();
        let rho = p / (GAS_CONSTANT * t * inv_w);
        let mut c = [0.0; 9];
        for k in 0..9 {
            c[k] = (rho * y[k] / self.weights[k]).max(0.0);
        }

        let (order_f, order_o) = self.params.fuel_orders;
        let q1 = self.params.fuel_oxidation.rate(t) * c[CH4].powf(order_f) * c[O2].powf(order_o);
        let kf2 = self.params.co_oxidation.rate(t);
        let q2 = kf2 * c[CO] * c[O2].sqrt() - kf2 / self.kc_co_oxidation(t) * c[CO2];
        let q3 = self.params.ionization_yield * q1;
        let q4 = self.params.recombination.rate(t) * c[H3O] * c[E];

        wdot.iter_mut().for_each(|w| *w = 0.0);
        // fuel step
        wdot[CH4] -= q1;
        wdot[O2] -= 1.5 * q1;
        wdot[CO] += q1;
        wdot[H2O] += 2.0 * q1;
        // CO oxidation
        wdot[CO] -= q2;
        wdot[O2] -= 0.5 * q2;
        wdot[CO2] += q2;
        // CH4 + O2 => CO + H3O+ + E + 0.5 H2
        wdot[CH4] -= q3;
        wdot[O2] -= q3;
        wdot[CO] += q3;
        wdot[H3O] += q3;
        wdot[E] += q3;
        wdot[H2] += 0.5 * q3;
        // recombination
        wdot[H3O] -= q4;
        wdot[E] -= q4;
        wdot[H2O] += q4;
        wdot[H2] += 0.5 * q4;
    }
}
