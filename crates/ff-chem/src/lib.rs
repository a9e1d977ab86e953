//! ff-chem: chemistry engines for flamefield.
//!
//! Provides:
//! - Species of the reduced methane/ion mechanism
//! - Composition handling and the equivalence-ratio mixing rule
//! - NASA7 thermodynamics and an ideal-gas equation of state
//! - Element-potential chemical equilibrium (TP and HP)
//! - Reduced kinetics with chemi-ionisation
//! - Lewis-number transport with ion mobilities
//!
//! # Architecture
//!
//! The flame model sees the engines only through the [`EquationOfState`],
//! [`Kinetics`] and [`TransportModel`] traits. [`Solution`] bundles the
//! default implementations.
//!
//! # Example
//!
//! ```no_run
//! use ff_chem::{EquationOfState, EquilibriumConstraint, GasState, Solution};
//! use ff_core::units::{k, pa};
//!
//! let sol = Solution::methane_ion();
//! let x = sol.mixture_for_equivalence_ratio(1.0, "CH4", "O2:0.21,N2:0.79").unwrap();
//! let state = GasState { temperature: k(300.0), pressure: pa(101_325.0), x };
//! let burned = sol.eos().equilibrate(&state, EquilibriumConstraint::HP).unwrap();
//! println!("T_ad = {:.1} K", burned.temperature.value);
//! ```

pub mod composition;
pub mod equilibrium;
pub mod error;
pub mod ideal_gas;
pub mod kinetics;
pub mod model;
pub mod solution;
pub mod species;
pub mod thermo;
pub mod transport;

pub use composition::Composition;
pub use equilibrium::EquilibriumOptions;
pub use error::{ChemError, ChemResult};
pub use ideal_gas::IdealGasMixture;
pub use kinetics::{Arrhenius, IonMechanismParams, ReducedIonKinetics};
pub use model::{EquationOfState, EquilibriumConstraint, GasState, Kinetics, TransportModel};
pub use solution::Solution;
pub use species::{Element, Species};
pub use thermo::Nasa7;
pub use transport::{LewisTransport, TransportKind, new_transport};
