//! Driver for coupled multi-domain boundary-value problems.
//!
//! `Sim1D` owns the domains and the global unknown vector. `solve` runs
//! steady Newton, falls back to pseudo-transient stepping when Newton fails,
//! and alternates with grid refinement until the refiner adds nothing.

use crate::banded::BandMatrix;
use crate::domain::{DomainKind, DomainSet, EvalContext, Layout};
use crate::error::{SolverError, SolverResult};
use crate::grid::{normalized_position, validate_grid};
use crate::jacobian::banded_fd_jacobian;
use crate::newton::{NewtonConfig, NewtonSystem, newton_solve};
use crate::refine::{RefineCriteria, Refiner};
use crate::snapshot::{ComponentSnapshot, DomainSnapshot, SolutionSnapshot};
use crate::timestep::{TimeStepConfig, advance};
use ff_core::numeric::linear_interp;
use tracing::{debug, info};

/// Counters accumulated over one call to [`Sim1D::solve`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SolveStats {
    pub newton_iterations: usize,
    pub jac_evals: usize,
    pub time_steps: usize,
    pub points_added: usize,
}

struct Checkpoint {
    x: Vec<f64>,
    grids: Vec<Vec<f64>>,
}

pub struct Sim1D<S: DomainSet> {
    domains: S,
    layout: Layout,
    x: Vec<f64>,
    newton: NewtonConfig,
    time_step: TimeStepConfig,
    refiners: Vec<Refiner>,
}

impl<S: DomainSet> Sim1D<S> {
    /// Lay out `domains` and fill the unknowns with each domain's initial values.
    pub fn new(domains: S) -> SolverResult<Self> {
        if domains.n_domains() == 0 {
            return Err(SolverError::ProblemSetup {
                what: "no domains".to_string(),
            });
        }
        for i in 0..domains.n_domains() {
            let d = domains.domain(i);
            match d.kind() {
                DomainKind::Bulk => validate_grid(d.grid()).map_err(|_| SolverError::ProblemSetup {
                    what: format!(
                        "domain '{}' needs at least two strictly increasing grid points",
                        d.name()
                    ),
                })?,
                DomainKind::Connector => {
                    if d.n_points() != 1 {
                        return Err(SolverError::ProblemSetup {
                            what: format!("connector '{}' must have exactly one point", d.name()),
                        });
                    }
                }
            }
        }

        let layout = Layout::from_domains(&domains);
        let mut x = vec![0.0; layout.size()];
        for (i, slot) in layout.slots().iter().enumerate() {
            let d = domains.domain(i);
            for j in 0..slot.n_points {
                for n in 0..slot.n_components {
                    x[slot.index(n, j)] = d.initial_value(n, j);
                }
            }
        }
        let refiners = vec![Refiner::default(); domains.n_domains()];
        Ok(Self {
            domains,
            layout,
            x,
            newton: NewtonConfig::default(),
            time_step: TimeStepConfig::default(),
            refiners,
        })
    }

    pub fn with_newton(mut self, newton: NewtonConfig) -> Self {
        self.newton = newton;
        self
    }

    pub fn with_time_step(mut self, time_step: TimeStepConfig) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn domains(&self) -> &S {
        &self.domains
    }

    /// Mutable access for changing domain settings between solves.
    ///
    /// Grids must be changed through [`Sim1D::insert_point`] so the unknown
    /// vector stays consistent.
    pub fn domains_mut(&mut self) -> &mut S {
        &mut self.domains
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn solution(&self) -> &[f64] {
        &self.x
    }

    fn check_index(&self, dom: usize, comp: usize, j: usize) -> SolverResult<usize> {
        if dom >= self.layout.n_domains() {
            return Err(SolverError::InvalidState {
                what: format!("domain index {dom} out of range"),
            });
        }
        let slot = self.layout.slot(dom);
        if comp >= slot.n_components || j >= slot.n_points {
            return Err(SolverError::InvalidState {
                what: format!(
                    "component {comp} point {j} out of range for domain '{}'",
                    self.domains.domain(dom).name()
                ),
            });
        }
        Ok(slot.index(comp, j))
    }

    pub fn value(&self, dom: usize, comp: usize, j: usize) -> SolverResult<f64> {
        Ok(self.x[self.check_index(dom, comp, j)?])
    }

    pub fn set_value(&mut self, dom: usize, comp: usize, j: usize, v: f64) -> SolverResult<()> {
        let k = self.check_index(dom, comp, j)?;
        self.x[k] = v;
        Ok(())
    }

    /// Profile of one component over a domain.
    pub fn profile(&self, dom: usize, comp: usize) -> SolverResult<Vec<f64>> {
        self.check_index(dom, comp, 0)?;
        let slot = self.layout.slot(dom);
        Ok((0..slot.n_points)
            .map(|j| self.x[slot.index(comp, j)])
            .collect())
    }

    /// Impose a piecewise-linear profile given at relative positions in
    /// `[0, 1]` of the domain's extent.
    pub fn set_profile(
        &mut self,
        dom: usize,
        comp: usize,
        locs: &[f64],
        vals: &[f64],
    ) -> SolverResult<()> {
        self.check_index(dom, comp, 0)?;
        let slot = self.layout.slot(dom);
        let z = self.domains.domain(dom).grid();
        for j in 0..slot.n_points {
            let frac = normalized_position(z, z[j]);
            self.x[slot.index(comp, j)] = linear_interp(frac, locs, vals)?;
        }
        Ok(())
    }

    pub fn set_flat_profile(&mut self, dom: usize, comp: usize, v: f64) -> SolverResult<()> {
        self.set_profile(dom, comp, &[0.0], &[v])
    }

    pub fn set_refine_criteria(&mut self, dom: usize, criteria: RefineCriteria) -> SolverResult<()> {
        criteria.validate()?;
        let refiner = self
            .refiners
            .get_mut(dom)
            .ok_or_else(|| SolverError::InvalidState {
                what: format!("domain index {dom} out of range"),
            })?;
        refiner.criteria = criteria;
        Ok(())
    }

    pub fn refine_criteria(&self, dom: usize) -> Option<RefineCriteria> {
        self.refiners.get(dom).map(|r| r.criteria)
    }

    pub fn set_max_grid_points(&mut self, dom: usize, max_points: usize) -> SolverResult<()> {
        let refiner = self
            .refiners
            .get_mut(dom)
            .ok_or_else(|| SolverError::InvalidState {
                what: format!("domain index {dom} out of range"),
            })?;
        refiner.max_points = max_points;
        Ok(())
    }

    /// Steady residual at the current solution.
    pub fn residual(&self) -> SolverResult<Vec<f64>> {
        let mut rsd = vec![0.0; self.layout.size()];
        self.eval(&self.x, &mut rsd, 0.0, None)?;
        Ok(rsd)
    }

    /// Evaluate bulk domains first, then connectors, then add the transient
    /// term to rows flagged by the domains.
    fn eval(
        &self,
        x: &[f64],
        rsd: &mut [f64],
        rdt: f64,
        x_prev: Option<&[f64]>,
    ) -> SolverResult<()> {
        rsd.iter_mut().for_each(|r| *r = 0.0);
        let mut diag = vec![false; x.len()];
        for pass in [DomainKind::Bulk, DomainKind::Connector] {
            for i in 0..self.domains.n_domains() {
                let d = self.domains.domain(i);
                if d.kind() != pass {
                    continue;
                }
                let ctx = EvalContext {
                    x,
                    layout: &self.layout,
                    index: i,
                };
                d.eval(&ctx, rsd, &mut diag)?;
            }
        }
        if let (true, Some(prev)) = (rdt > 0.0, x_prev) {
            for k in 0..x.len() {
                if diag[k] {
                    rsd[k] -= rdt * (x[k] - prev[k]);
                }
            }
        }
        if let Some(k) = rsd.iter().position(|r| !r.is_finite()) {
            return Err(SolverError::Numeric {
                what: format!("non-finite residual in row {k}"),
            });
        }
        Ok(())
    }

    fn steady_newton(&mut self) -> SolverResult<(usize, usize)> {
        let mut x = self.x.clone();
        let view = SystemView::new(self, 0.0, None);
        let result = newton_solve(&view, &mut x, &self.newton)?;
        self.x = x;
        Ok((result.iterations, result.jac_evals))
    }

    fn transient_steps(&mut self, n_steps: usize, dt: f64) -> SolverResult<f64> {
        let mut x = self.x.clone();
        let this = &*self;
        let dt = advance(&mut x, n_steps, dt, &this.time_step, |x, rdt, prev| {
            let view = SystemView::new(this, rdt, Some(prev));
            newton_solve(&view, x, &this.newton).map(|_| ())
        })?;
        self.x = x;
        Ok(dt)
    }

    /// Solve the coupled problem, refining the grid when `refine` is set.
    ///
    /// On error the unknowns and grids are restored to their state on entry.
    pub fn solve(&mut self, loglevel: u8, refine: bool) -> SolverResult<SolveStats> {
        let checkpoint = self.checkpoint();
        let result = self.solve_inner(loglevel, refine);
        if result.is_err() {
            self.restore(checkpoint)?;
        }
        result
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            x: self.x.clone(),
            grids: (0..self.domains.n_domains())
                .map(|i| self.domains.domain(i).grid().to_vec())
                .collect(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) -> SolverResult<()> {
        for (i, grid) in checkpoint.grids.iter().enumerate() {
            if self.domains.domain(i).grid() != grid.as_slice() {
                self.domains.domain_mut(i).set_grid(grid)?;
            }
        }
        self.layout = Layout::from_domains(&self.domains);
        self.x = checkpoint.x;
        Ok(())
    }

    fn solve_inner(&mut self, loglevel: u8, refine: bool) -> SolverResult<SolveStats> {
        let mut stats = SolveStats::default();
        let mut dt = self.time_step.dt_initial;
        loop {
            let mut round = 0;
            loop {
                match self.steady_newton() {
                    Ok((iterations, jac_evals)) => {
                        stats.newton_iterations += iterations;
                        stats.jac_evals += jac_evals;
                        if loglevel > 0 {
                            info!(points = self.layout.size(), iterations, "steady Newton converged");
                        }
                        break;
                    }
                    Err(err) if err.is_recoverable() => {
                        if round >= self.time_step.max_rounds {
                            return Err(SolverError::ConvergenceFailed {
                                what: format!(
                                    "no steady solution after {round} time-stepping rounds: {err}"
                                ),
                            });
                        }
                        let n = self.time_step.steps_for_round(round);
                        if loglevel > 1 {
                            debug!(round, n, dt, "steady Newton failed, time stepping: {err}");
                        }
                        dt = self.transient_steps(n, dt)?;
                        stats.time_steps += n;
                        round += 1;
                    }
                    Err(err) => return Err(err),
                }
            }

            if !refine {
                return Ok(stats);
            }
            let added = self.refine(loglevel)?;
            stats.points_added += added;
            if added == 0 {
                return Ok(stats);
            }
        }
    }

    /// Insert midpoints wherever the refiner asks; returns the number added.
    pub fn refine(&mut self, loglevel: u8) -> SolverResult<usize> {
        let mut total = 0;
        for i in 0..self.domains.n_domains() {
            let d = self.domains.domain(i);
            if d.kind() != DomainKind::Bulk {
                continue;
            }
            let slot = self.layout.slot(i);
            let profiles: Vec<Vec<f64>> = (0..slot.n_components)
                .filter(|&n| d.refine_active(n))
                .map(|n| (0..slot.n_points).map(|j| self.x[slot.index(n, j)]).collect())
                .collect();
            let z = d.grid().to_vec();
            let intervals = self.refiners[i].analyze(&z, &profiles)?;
            if loglevel > 0 && !intervals.is_empty() {
                info!(domain = d.name(), added = intervals.len(), "refining grid");
            }
            for &j in intervals.iter().rev() {
                self.insert_point(i, j, 0.5 * (z[j] + z[j + 1]))?;
            }
            total += intervals.len();
        }
        Ok(total)
    }

    /// Insert a point at `z` inside interval `interval` of bulk domain `dom`,
    /// interpolating every component linearly. Returns the new point index.
    pub fn insert_point(&mut self, dom: usize, interval: usize, z: f64) -> SolverResult<usize> {
        self.check_index(dom, 0, 0)?;
        let slot = self.layout.slot(dom);
        let d = self.domains.domain(dom);
        if d.kind() != DomainKind::Bulk {
            return Err(SolverError::InvalidState {
                what: format!("cannot insert a point into connector '{}'", d.name()),
            });
        }
        let grid = d.grid();
        if interval + 1 >= grid.len() {
            return Err(SolverError::InvalidState {
                what: format!("interval {interval} out of range"),
            });
        }
        let (za, zb) = (grid[interval], grid[interval + 1]);
        if !(z > za && z < zb) {
            return Err(SolverError::InvalidState {
                what: format!("point {z} does not lie strictly inside [{za}, {zb}]"),
            });
        }

        let frac = (z - za) / (zb - za);
        let nc = slot.n_components;
        let mut new_grid = Vec::with_capacity(grid.len() + 1);
        new_grid.extend_from_slice(&grid[..=interval]);
        new_grid.push(z);
        new_grid.extend_from_slice(&grid[interval + 1..]);

        let split = slot.index(0, interval + 1);
        let mut x = Vec::with_capacity(self.x.len() + nc);
        x.extend_from_slice(&self.x[..split]);
        for n in 0..nc {
            let a = self.x[slot.index(n, interval)];
            let b = self.x[slot.index(n, interval + 1)];
            x.push(a + frac * (b - a));
        }
        x.extend_from_slice(&self.x[split..]);

        self.domains.domain_mut(dom).set_grid(&new_grid)?;
        self.layout = Layout::from_domains(&self.domains);
        self.x = x;
        Ok(interval + 1)
    }

    /// Copy of every domain's grid and component profiles.
    pub fn snapshot(&self, id: &str, description: &str) -> SolutionSnapshot {
        let domains = self
            .layout
            .slots()
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                let d = self.domains.domain(i);
                DomainSnapshot {
                    name: d.name().to_string(),
                    grid: d.grid().to_vec(),
                    components: (0..slot.n_components)
                        .map(|n| ComponentSnapshot {
                            name: d.component_name(n),
                            values: (0..slot.n_points)
                                .map(|j| self.x[slot.index(n, j)])
                                .collect(),
                        })
                        .collect(),
                }
            })
            .collect();
        SolutionSnapshot {
            id: id.to_string(),
            description: description.to_string(),
            domains,
        }
    }
}

/// The problem seen by Newton, optionally with a transient term.
struct SystemView<'s, S: DomainSet> {
    sim: &'s Sim1D<S>,
    rdt: f64,
    x_prev: Option<&'s [f64]>,
    bounds: Vec<(f64, f64)>,
    /// Per-unknown (rtol, atol)
    tols: Vec<(f64, f64)>,
}

impl<'s, S: DomainSet> SystemView<'s, S> {
    fn new(sim: &'s Sim1D<S>, rdt: f64, x_prev: Option<&'s [f64]>) -> Self {
        let transient = x_prev.is_some();
        let size = sim.layout.size();
        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY); size];
        let mut tols = vec![(1e-4, 1e-9); size];
        for (i, slot) in sim.layout.slots().iter().enumerate() {
            let d = sim.domains.domain(i);
            for n in 0..slot.n_components {
                let b = d.bounds(n);
                let t = d.tolerances(n, transient);
                for j in 0..slot.n_points {
                    let k = slot.index(n, j);
                    bounds[k] = b;
                    tols[k] = t;
                }
            }
        }
        Self {
            sim,
            rdt,
            x_prev,
            bounds,
            tols,
        }
    }
}

impl<S: DomainSet> NewtonSystem for SystemView<'_, S> {
    fn size(&self) -> usize {
        self.sim.layout.size()
    }

    fn residual(&self, x: &[f64], out: &mut [f64]) -> SolverResult<()> {
        self.sim.eval(x, out, self.rdt, self.x_prev)
    }

    fn jacobian(&self, x: &[f64], r0: &[f64]) -> SolverResult<BandMatrix> {
        let abs_step: Vec<f64> = self
            .tols
            .iter()
            .map(|&(_, atol)| (1e3 * atol).min(f64::EPSILON.sqrt()))
            .collect();
        let mut jac = banded_fd_jacobian(
            x,
            r0,
            self.sim.layout.bandwidth(),
            self.sim.newton.fd_rel_step,
            &abs_step,
            |xp, out| self.residual(xp, out),
        )?;
        jac.factor()?;
        Ok(jac)
    }

    /// `rtol · mean|x_n| + atol` for every unknown of component `n`.
    fn error_weights(&self, x: &[f64]) -> Vec<f64> {
        let mut ewt = vec![1.0; x.len()];
        for slot in self.sim.layout.slots() {
            for n in 0..slot.n_components {
                let mean = (0..slot.n_points)
                    .map(|j| x[slot.index(n, j)].abs())
                    .sum::<f64>()
                    / slot.n_points.max(1) as f64;
                for j in 0..slot.n_points {
                    let k = slot.index(n, j);
                    let (rtol, atol) = self.tols[k];
                    ewt[k] = rtol * mean + atol;
                }
            }
        }
        ewt
    }

    fn bounds(&self, i: usize) -> (f64, f64) {
        self.bounds[i]
    }
}
