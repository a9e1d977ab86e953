//! Deterministic file names derived from a case's equivalence ratio and field.

use serde::{Deserialize, Serialize};

/// Identifies one flame case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaseKey {
    pub phi: f64,
    /// Applied field at the inlet [V/m]
    pub e_field: f64,
}

impl CaseKey {
    pub fn new(phi: f64, e_field: f64) -> Self {
        Self { phi, e_field }
    }

    /// `{prefix}_phi{phi}_eField{field}`, both values with six decimals.
    pub fn stem(&self, prefix: &str) -> String {
        format!("{prefix}_phi{:.6}_eField{:.6}", self.phi, self.e_field)
    }

    pub fn gap_voltage_csv(&self) -> String {
        format!("{}.csv", self.stem("gapvoltage"))
    }

    pub fn profile_csv(&self) -> String {
        format!("{}.csv", self.stem("flamespeed"))
    }

    pub fn snapshot_json(&self) -> String {
        format!("{}.json", self.stem("flamespeed"))
    }

    pub fn manifest_json(&self) -> String {
        format!("{}.json", self.stem("manifest"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_use_six_decimals() {
        let key = CaseKey::new(0.6, 1000.0);
        assert_eq!(key.gap_voltage_csv(), "gapvoltage_phi0.600000_eField1000.000000.csv");
        assert_eq!(key.profile_csv(), "flamespeed_phi0.600000_eField1000.000000.csv");
        assert_eq!(key.snapshot_json(), "flamespeed_phi0.600000_eField1000.000000.json");
        assert_eq!(key.manifest_json(), "manifest_phi0.600000_eField1000.000000.json");
    }

    #[test]
    fn negative_field_keeps_sign() {
        let key = CaseKey::new(1.0, -50.0);
        assert_eq!(key.stem("x"), "x_phi1.000000_eField-50.000000");
    }
}
