// ff-core/src/units.rs

use uom::si::f64::{
    ElectricPotential as UomElectricPotential, Length as UomLength,
    MassDensity as UomMassDensity, Pressure as UomPressure, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature, Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Density = UomMassDensity;
pub type Length = UomLength;
pub type Potential = UomElectricPotential;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;
pub type Velocity = UomVelocity;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn kgpm3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn volts(v: f64) -> Potential {
    use uom::si::electric_potential::volt;
    Potential::new::<volt>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

/// Physical constants in SI units with kmol as the amount unit.
pub mod constants {
    use super::*;

    /// Universal gas constant [J/(kmol·K)]
    pub const GAS_CONSTANT: f64 = 8_314.462_618;
    /// Faraday constant [C/kmol]
    pub const FARADAY: f64 = 9.648_533_212e7;
    /// Vacuum permittivity [F/m]
    pub const EPSILON_0: f64 = 8.854_187_812_8e-12;
    /// Boltzmann constant [J/K]
    pub const BOLTZMANN: f64 = 1.380_649e-23;
    /// Elementary charge [C]
    pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;
    /// Standard pressure of the thermodynamic tables [Pa]
    pub const P_REF: f64 = 101_325.0;
    pub const ONE_ATM: f64 = 101_325.0;

    #[inline]
    pub fn one_atm() -> Pressure {
        pa(ONE_ATM)
    }
}
