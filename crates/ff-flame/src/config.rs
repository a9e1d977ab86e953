//! Run configuration, with defaults for a methane/air flame at ambient
//! conditions. Any subset can be overridden from YAML.

use crate::error::{FlameError, FlameResult};
use ff_chem::{Composition, TransportKind};
use ff_oned::{NewtonConfig, RefineCriteria, TimeStepConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixtureConfig {
    pub fuel: String,
    pub oxidizer: String,
    pub temperature_k: f64,
    pub pressure_pa: f64,
    /// Initial guess for the inlet velocity [m/s]
    pub inlet_velocity_mps: f64,
}

impl Default for MixtureConfig {
    fn default() -> Self {
        Self {
            fuel: "CH4".to_string(),
            oxidizer: "O2:0.21,N2:0.79".to_string(),
            temperature_k: 300.0,
            pressure_pa: ff_core::constants::ONE_ATM,
            inlet_velocity_mps: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Points of the starting grid
    pub points: usize,
    pub length_m: f64,
    /// Refinement stops with an error beyond this many points
    pub max_points: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            points: 6,
            length_m: 0.1,
            max_points: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub mixture: MixtureConfig,
    pub grid: GridConfig,
    /// Relative positions of the initial-guess knots: unburned values at the
    /// first two, burned values at the last two.
    pub guess_locations: Vec<f64>,
    pub refine: RefineCriteria,
    /// `"Ion"` or `"Mix"`
    pub transport: String,
    pub newton: NewtonConfig,
    pub time_step: TimeStepConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mixture: MixtureConfig::default(),
            grid: GridConfig::default(),
            guess_locations: vec![0.0, 0.3, 0.7, 1.0],
            refine: RefineCriteria {
                ratio: 10.0,
                slope: 0.08,
                curve: 0.1,
            },
            transport: "Ion".to_string(),
            newton: NewtonConfig::default(),
            time_step: TimeStepConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn from_yaml_str(s: &str) -> FlameResult<Self> {
        let config: RunConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> FlameResult<Self> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> FlameResult<()> {
        let m = &self.mixture;
        m.fuel.parse::<Composition>()?;
        m.oxidizer.parse::<Composition>()?;
        for (name, v) in [
            ("mixture.temperature_k", m.temperature_k),
            ("mixture.pressure_pa", m.pressure_pa),
            ("mixture.inlet_velocity_mps", m.inlet_velocity_mps),
            ("grid.length_m", self.grid.length_m),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(FlameError::config(format!("{name} must be positive, got {v}")));
            }
        }

        if self.grid.points < 2 {
            return Err(FlameError::config("grid.points must be at least 2"));
        }
        if self.grid.max_points < self.grid.points {
            return Err(FlameError::config(format!(
                "grid.max_points ({}) is below grid.points ({})",
                self.grid.max_points, self.grid.points
            )));
        }

        let locs = &self.guess_locations;
        if locs.len() != 4 {
            return Err(FlameError::config(format!(
                "guess_locations needs 4 entries, got {}",
                locs.len()
            )));
        }
        if locs.iter().any(|l| !(0.0..=1.0).contains(l)) || locs.windows(2).any(|w| w[1] < w[0]) {
            return Err(FlameError::config(
                "guess_locations must be non-decreasing within [0, 1]",
            ));
        }

        self.refine.validate()?;
        self.transport.parse::<TransportKind>()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = RunConfig::default();
        c.validate().unwrap();
        assert_eq!(c.grid.points, 6);
        assert_eq!(c.refine.slope, 0.08);
        assert_eq!(c.refine.curve, 0.1);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let c = RunConfig::from_yaml_str(
            "mixture:\n  temperature_k: 350.0\ngrid:\n  points: 10\ntransport: Mix\n",
        )
        .unwrap();
        assert_eq!(c.mixture.temperature_k, 350.0);
        assert_eq!(c.mixture.fuel, "CH4");
        assert_eq!(c.grid.points, 10);
        assert_eq!(c.grid.length_m, 0.1);
        assert_eq!(c.transport, "Mix");
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(RunConfig::from_yaml_str("grid:\n  points: 1\n").is_err());
        assert!(RunConfig::from_yaml_str("transport: Multi\n").is_err());
        assert!(RunConfig::from_yaml_str("guess_locations: [0.0, 0.7, 0.3, 1.0]\n").is_err());
        assert!(RunConfig::from_yaml_str("mixture:\n  fuel: XY\n").is_err());
        assert!(RunConfig::from_yaml_str("mixture:\n  pressure_pa: -1.0\n").is_err());
    }

    #[test]
    fn yaml_round_trip() {
        let c = RunConfig::default();
        let text = serde_yaml::to_string(&c).unwrap();
        assert_eq!(RunConfig::from_yaml_str(&text).unwrap(), c);
    }
}
