//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

/// Summary of one flame case, written next to its tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub timestamp: String,
    pub phi: f64,
    pub e_field: f64,
    pub t_adiabatic_k: f64,
    /// Inlet velocity of the converged free flame [m/s]
    pub flame_speed_mps: f64,
    /// `None` when the field-coupled stage failed
    pub gap_voltage_v: Option<f64>,
    pub field_stage: FieldStageStatus,
    pub n_points: usize,
    pub solver_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum FieldStageStatus {
    Converged,
    Failed { message: String },
}

impl FieldStageStatus {
    pub fn is_converged(&self) -> bool {
        matches!(self, FieldStageStatus::Converged)
    }
}
