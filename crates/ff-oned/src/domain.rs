//! Domains, their placement in the global unknown vector, and evaluation context.

use crate::error::SolverResult;

/// Role of a domain in the coupled problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainKind {
    /// Spatially resolved domain owning its residual rows.
    Bulk,
    /// Single-point boundary that also overwrites edge rows of its neighbours.
    /// Connectors are evaluated after every bulk domain.
    Connector,
}

/// Position of one domain inside the global unknown vector.
///
/// Unknowns are stored point-major: `loc + j * n_components + n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainSlot {
    pub loc: usize,
    pub n_components: usize,
    pub n_points: usize,
}

impl DomainSlot {
    pub fn size(&self) -> usize {
        self.n_components * self.n_points
    }

    #[inline]
    pub fn index(&self, n: usize, j: usize) -> usize {
        self.loc + j * self.n_components + n
    }
}

/// Slots for every domain, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    slots: Vec<DomainSlot>,
    size: usize,
}

impl Layout {
    pub fn from_domains<S: DomainSet + ?Sized>(set: &S) -> Self {
        let mut slots = Vec::with_capacity(set.n_domains());
        let mut loc = 0;
        for i in 0..set.n_domains() {
            let d = set.domain(i);
            let slot = DomainSlot {
                loc,
                n_components: d.n_components(),
                n_points: d.n_points(),
            };
            loc += slot.size();
            slots.push(slot);
        }
        Self { slots, size: loc }
    }

    /// Layout from explicit slots; they must be contiguous and in order.
    pub fn from_slots(slots: Vec<DomainSlot>) -> Self {
        let size = slots.iter().map(DomainSlot::size).sum();
        Self { slots, size }
    }

    /// Total number of unknowns.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn n_domains(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, i: usize) -> DomainSlot {
        self.slots[i]
    }

    pub fn slots(&self) -> &[DomainSlot] {
        &self.slots
    }

    /// Half-bandwidth of the global Jacobian.
    ///
    /// Bulk rows couple to nearest-neighbour points; connector rows couple to
    /// the adjacent edge point of their neighbour.
    pub fn bandwidth(&self) -> usize {
        let within = self
            .slots
            .iter()
            .map(|s| 2 * s.n_components)
            .max()
            .unwrap_or(1);
        let across = self
            .slots
            .windows(2)
            .map(|w| w[0].n_components + w[1].n_components)
            .max()
            .unwrap_or(0);
        within.max(across).saturating_sub(1).max(1)
    }
}

/// Read-only view handed to [`Domain::eval`].
pub struct EvalContext<'a> {
    /// Global unknown vector.
    pub x: &'a [f64],
    pub layout: &'a Layout,
    /// Index of the domain being evaluated.
    pub index: usize,
}

impl EvalContext<'_> {
    pub fn slot(&self) -> DomainSlot {
        self.layout.slot(self.index)
    }

    pub fn left(&self) -> Option<DomainSlot> {
        self.index.checked_sub(1).map(|i| self.layout.slot(i))
    }

    pub fn right(&self) -> Option<DomainSlot> {
        (self.index + 1 < self.layout.n_domains()).then(|| self.layout.slot(self.index + 1))
    }

    /// Value of component `n` at local point `j` of this domain.
    #[inline]
    pub fn value(&self, n: usize, j: usize) -> f64 {
        self.x[self.slot().index(n, j)]
    }
}

/// One sub-domain of a coupled boundary-value problem.
pub trait Domain {
    fn name(&self) -> &str;

    fn kind(&self) -> DomainKind {
        DomainKind::Bulk
    }

    fn n_components(&self) -> usize;

    fn n_points(&self) -> usize {
        self.grid().len()
    }

    fn component_name(&self, n: usize) -> String;

    fn component_index(&self, name: &str) -> Option<usize> {
        (0..self.n_components()).find(|&n| self.component_name(n) == name)
    }

    /// Lower and upper bound of component `n` during Newton steps.
    fn bounds(&self, n: usize) -> (f64, f64);

    /// `(rtol, atol)` for component `n`.
    fn tolerances(&self, _n: usize, _transient: bool) -> (f64, f64) {
        (1e-4, 1e-9)
    }

    /// Point coordinates; a connector reports the single coordinate it sits at.
    fn grid(&self) -> &[f64];

    /// Replace the grid after point insertion.
    fn set_grid(&mut self, z: &[f64]) -> SolverResult<()>;

    /// Whether component `n` takes part in grid refinement.
    fn refine_active(&self, _n: usize) -> bool {
        true
    }

    /// Starting value before any profile is imposed.
    fn initial_value(&self, _n: usize, _j: usize) -> f64 {
        0.0
    }

    /// Write steady residuals into the global `rsd`; set `diag[i]` for rows
    /// that carry a time derivative.
    ///
    /// A flagged row must hold the rate of change `dx/dt` of its unknown, so
    /// that subtracting `(x - x_prev) / dt` gives the implicit Euler residual.
    /// Connectors run after bulk domains and may overwrite or add to their
    /// edge rows, clearing `diag` where the new row is algebraic.
    fn eval(&self, ctx: &EvalContext<'_>, rsd: &mut [f64], diag: &mut [bool]) -> SolverResult<()>;
}

/// Ordered collection of domains solved together.
pub trait DomainSet {
    fn n_domains(&self) -> usize;
    fn domain(&self, i: usize) -> &dyn Domain;
    fn domain_mut(&mut self, i: usize) -> &mut dyn Domain;
}

impl<'a> DomainSet for Vec<Box<dyn Domain + 'a>> {
    fn n_domains(&self) -> usize {
        self.len()
    }

    fn domain(&self, i: usize) -> &dyn Domain {
        self[i].as_ref()
    }

    fn domain_mut(&mut self, i: usize) -> &mut dyn Domain {
        self[i].as_mut()
    }
}
