//! Engines and configuration shared by every case of a run.

use crate::config::RunConfig;
use crate::error::FlameResult;
use ff_chem::{EquationOfState, Kinetics, Solution, TransportModel, new_transport};

/// Immutable per-run context, passed by reference.
///
/// Cases built from the same context share the engines read-only, so one
/// context can drive a parallel sweep.
pub struct RunContext {
    solution: Solution,
    transport: Box<dyn TransportModel>,
    config: RunConfig,
}

impl RunContext {
    /// Reference methane/ion mechanism with the configured transport model.
    pub fn new(config: RunConfig) -> FlameResult<Self> {
        config.validate()?;
        let solution = Solution::methane_ion();
        let transport = new_transport(&config.transport, solution.species())?;
        Ok(Self::with_parts(solution, transport, config))
    }

    pub fn with_parts(solution: Solution, transport: Box<dyn TransportModel>, config: RunConfig) -> Self {
        Self {
            solution,
            transport,
            config,
        }
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn eos(&self) -> &dyn EquationOfState {
        self.solution.eos()
    }

    pub fn kinetics(&self) -> &dyn Kinetics {
        self.solution.kinetics()
    }

    pub fn transport(&self) -> &dyn TransportModel {
        self.transport.as_ref()
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("eos", &self.eos().name())
            .field("transport", &self.transport.name())
            .field("config", &self.config)
            .finish()
    }
}
