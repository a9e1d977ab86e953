//! Profiles read back from a solved flame, and their tables.

use crate::error::FlameResult;
use crate::solver::NonlinearBvpSolver;
use ff_results::Table;

pub const PROFILE_COLUMNS: [&str; 5] = ["grid", "temperature", "velocity", "ePotential", "eField"];
pub const GAP_VOLTAGE_COLUMNS: [&str; 2] = ["eField", "gapVoltage"];

/// Parallel sequences, one entry per grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct FlameProfile {
    pub z: Vec<f64>,
    pub temperature: Vec<f64>,
    pub velocity: Vec<f64>,
    pub potential: Vec<f64>,
    pub e_field: Vec<f64>,
}

impl FlameProfile {
    pub fn extract<S: NonlinearBvpSolver + ?Sized>(solver: &S) -> FlameResult<Self> {
        Ok(Self {
            z: solver.grid()?,
            temperature: solver.profile("T")?,
            velocity: solver.profile("velocity")?,
            potential: solver.profile("ePotential")?,
            e_field: solver.profile("eField")?,
        })
    }

    pub fn n_points(&self) -> usize {
        self.z.len()
    }

    /// Velocity of the unburned gas entering the flame.
    pub fn flame_speed(&self) -> f64 {
        self.velocity.first().copied().unwrap_or(f64::NAN)
    }

    pub fn to_table(&self) -> FlameResult<Table> {
        Ok(Table::from_columns(
            &PROFILE_COLUMNS,
            vec![
                self.z.clone(),
                self.temperature.clone(),
                self.velocity.clone(),
                self.potential.clone(),
                self.e_field.clone(),
            ],
        )?)
    }
}

/// One row per `(field, gap voltage)` pair.
pub fn gap_voltage_table(rows: &[(f64, f64)]) -> FlameResult<Table> {
    let (fields, voltages): (Vec<f64>, Vec<f64>) = rows.iter().copied().unzip();
    Ok(Table::from_columns(&GAP_VOLTAGE_COLUMNS, vec![fields, voltages])?)
}
