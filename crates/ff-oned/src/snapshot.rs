//! Serializable copy of a solved multi-domain state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSnapshot {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSnapshot {
    pub name: String,
    pub grid: Vec<f64>,
    pub components: Vec<ComponentSnapshot>,
}

impl DomainSnapshot {
    pub fn component(&self, name: &str) -> Option<&[f64]> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }
}

/// Every domain with its grid and component profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionSnapshot {
    pub id: String,
    pub description: String,
    pub domains: Vec<DomainSnapshot>,
}

impl SolutionSnapshot {
    pub fn domain(&self, name: &str) -> Option<&DomainSnapshot> {
        self.domains.iter().find(|d| d.name == name)
    }
}
