//! Solve stages and the controller's state machine.

use crate::error::{FlameError, FlameResult};
use serde::{Deserialize, Serialize};

/// Physics active in the flow domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SolveStage {
    /// Field and potential pinned to zero; ambipolar ions, quasi-neutral electrons.
    EnergyOnly,
    /// Gauss's law, the potential equation and charged-species drift.
    FieldCoupled,
}

impl SolveStage {
    /// Numeric stage marker (1 or 2).
    pub fn marker(self) -> u8 {
        match self {
            SolveStage::EnergyOnly => 1,
            SolveStage::FieldCoupled => 2,
        }
    }

    /// Stage that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            SolveStage::EnergyOnly => Some(SolveStage::FieldCoupled),
            SolveStage::FieldCoupled => None,
        }
    }

    /// Move to `target`. Staying put is allowed; going back is not.
    pub fn advance_to(self, target: SolveStage) -> FlameResult<Self> {
        if target < self {
            return Err(FlameError::contract(format!(
                "stage cannot go back from {} to {}",
                self.marker(),
                target.marker()
            )));
        }
        Ok(target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerState {
    Created,
    Anchored,
    Stage1Converged,
    Stage2Converged,
    Stage2Failed,
    Extracted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerEvent {
    Anchor,
    Stage1Solved,
    Stage2Solved,
    Stage2Failed,
    Extract,
}

impl ControllerState {
    /// Apply `event`; anything outside the transition table is an error.
    pub fn on(self, event: ControllerEvent) -> FlameResult<Self> {
        use ControllerEvent as E;
        use ControllerState as S;
        let next = match (self, event) {
            (S::Created, E::Anchor) => S::Anchored,
            (S::Anchored, E::Stage1Solved) => S::Stage1Converged,
            (S::Stage1Converged, E::Stage2Solved) => S::Stage2Converged,
            (S::Stage1Converged, E::Stage2Failed) => S::Stage2Failed,
            (S::Stage2Converged | S::Stage2Failed, E::Extract) => S::Extracted,
            (state, event) => {
                return Err(FlameError::contract(format!(
                    "event {event:?} not allowed in state {state:?}"
                )));
            }
        };
        Ok(next)
    }

    pub fn is_terminal(self) -> bool {
        self == ControllerState::Extracted
    }
}
