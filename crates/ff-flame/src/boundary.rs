//! Single-point boundaries at the two ends of the flow.

use crate::flow::{C_EFIELD, C_EPOTENTIAL, C_SPECIES, C_TEMPERATURE, C_VELOCITY};
use ff_chem::EquationOfState;
use ff_oned::{Domain, DomainKind, DomainSlot, EvalContext, SolverError, SolverResult};

fn neighbour(slot: Option<DomainSlot>, who: &str) -> SolverResult<DomainSlot> {
    slot.ok_or_else(|| SolverError::ProblemSetup {
        what: format!("{who} has no adjacent flow domain"),
    })
}

/// Inflow of fresh mixture with an applied electric field.
///
/// Owns the mass flux and the inflow temperature. Completes the flow's first
/// point: fixes its temperature and field, and adds the convective inflow
/// of every non-balance species.
pub struct Inlet1D<'a> {
    eos: &'a dyn EquationOfState,
    pressure: f64,
    z: [f64; 1],
    mdot: f64,
    temperature: f64,
    y: Vec<f64>,
    balance: usize,
    e_field: f64,
}

impl<'a> Inlet1D<'a> {
    pub const C_MDOT: usize = 0;
    pub const C_TEMPERATURE: usize = 1;

    pub fn new(eos: &'a dyn EquationOfState, pressure: f64, z: f64, balance: usize) -> Self {
        let mut y = vec![0.0; eos.n_species()];
        y[balance] = 1.0;
        Self {
            eos,
            pressure,
            z: [z],
            mdot: 0.0,
            temperature: 300.0,
            y,
            balance,
            e_field: 0.0,
        }
    }

    pub fn set_mdot(&mut self, mdot: f64) {
        self.mdot = mdot;
    }

    pub fn mdot(&self) -> f64 {
        self.mdot
    }

    pub fn set_temperature(&mut self, t: f64) {
        self.temperature = t;
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn set_mass_fractions(&mut self, y: Vec<f64>) {
        self.y = y;
    }

    pub fn mass_fractions(&self) -> &[f64] {
        &self.y
    }

    /// Field applied at the inlet [V/m].
    pub fn set_e_field(&mut self, e: f64) {
        self.e_field = e;
    }

    pub fn e_field(&self) -> f64 {
        self.e_field
    }
}

impl Domain for Inlet1D<'_> {
    fn name(&self) -> &str {
        "inlet"
    }

    fn kind(&self) -> DomainKind {
        DomainKind::Connector
    }

    fn n_components(&self) -> usize {
        2
    }

    fn component_name(&self, n: usize) -> String {
        match n {
            Self::C_MDOT => "mdot",
            _ => "temperature",
        }
        .to_string()
    }

    fn bounds(&self, n: usize) -> (f64, f64) {
        match n {
            Self::C_MDOT => (-1e20, 1e20),
            _ => (200.0, 6000.0),
        }
    }

    fn grid(&self) -> &[f64] {
        &self.z
    }

    fn set_grid(&mut self, z: &[f64]) -> SolverResult<()> {
        match z {
            [z0] => {
                self.z = [*z0];
                Ok(())
            }
            _ => Err(SolverError::ProblemSetup {
                what: "inlet holds exactly one point".to_string(),
            }),
        }
    }

    fn refine_active(&self, _n: usize) -> bool {
        false
    }

    fn initial_value(&self, n: usize, _j: usize) -> f64 {
        match n {
            Self::C_MDOT => self.mdot,
            _ => self.temperature,
        }
    }

    fn eval(&self, ctx: &EvalContext<'_>, rsd: &mut [f64], diag: &mut [bool]) -> SolverResult<()> {
        let own = ctx.slot();
        let flow = neighbour(ctx.right(), "inlet")?;
        let x = ctx.x;
        let ns = self.y.len();

        let mdot = x[own.index(Self::C_MDOT, 0)];
        let t0 = x[flow.index(C_TEMPERATURE, 0)];
        let y0: Vec<f64> = (0..ns).map(|k| x[flow.index(C_SPECIES + k, 0)]).collect();
        let rho0 = self.eos.density(t0, self.pressure, &y0);

        rsd[own.index(Self::C_MDOT, 0)] = mdot - rho0 * x[flow.index(C_VELOCITY, 0)];
        rsd[own.index(Self::C_TEMPERATURE, 0)] = x[own.index(Self::C_TEMPERATURE, 0)] - self.temperature;

        let kt = flow.index(C_TEMPERATURE, 0);
        rsd[kt] -= self.temperature;
        diag[kt] = false;
        for k in (0..ns).filter(|&k| k != self.balance) {
            let row = flow.index(C_SPECIES + k, 0);
            rsd[row] += mdot * self.y[k];
            diag[row] = false;
        }
        rsd[flow.index(C_EFIELD, 0)] -= self.e_field;
        Ok(())
    }
}

/// Zero-gradient outflow with grounded potential.
pub struct Outlet1D {
    z: [f64; 1],
    n_species: usize,
    balance: usize,
}

impl Outlet1D {
    pub fn new(z: f64, n_species: usize, balance: usize) -> Self {
        Self {
            z: [z],
            n_species,
            balance,
        }
    }
}

impl Domain for Outlet1D {
    fn name(&self) -> &str {
        "outlet"
    }

    fn kind(&self) -> DomainKind {
        DomainKind::Connector
    }

    fn n_components(&self) -> usize {
        1
    }

    fn component_name(&self, _n: usize) -> String {
        "zero".to_string()
    }

    fn bounds(&self, _n: usize) -> (f64, f64) {
        (-1e5, 1e5)
    }

    fn grid(&self) -> &[f64] {
        &self.z
    }

    fn set_grid(&mut self, z: &[f64]) -> SolverResult<()> {
        match z {
            [z0] => {
                self.z = [*z0];
                Ok(())
            }
            _ => Err(SolverError::ProblemSetup {
                what: "outlet holds exactly one point".to_string(),
            }),
        }
    }

    fn refine_active(&self, _n: usize) -> bool {
        false
    }

    fn eval(&self, ctx: &EvalContext<'_>, rsd: &mut [f64], diag: &mut [bool]) -> SolverResult<()> {
        let own = ctx.slot();
        let flow = neighbour(ctx.left(), "outlet")?;
        let x = ctx.x;
        let last = flow.n_points - 1;

        rsd[own.index(0, 0)] = x[own.index(0, 0)];

        let mut zero_gradient = |c: usize| {
            let row = flow.index(c, last);
            rsd[row] = x[row] - x[flow.index(c, last - 1)];
            diag[row] = false;
        };
        zero_gradient(C_TEMPERATURE);
        for k in (0..self.n_species).filter(|&k| k != self.balance) {
            zero_gradient(C_SPECIES + k);
        }

        let kp = flow.index(C_EPOTENTIAL, last);
        rsd[kp] = x[kp];
        diag[kp] = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_chem::Solution;

    #[test]
    fn inlet_components() {
        let sol = Solution::methane_ion();
        let mut inlet = Inlet1D::new(sol.eos(), 101_325.0, 0.0, 6);
        inlet.set_mdot(0.35);
        inlet.set_temperature(300.0);
        assert_eq!(inlet.kind(), DomainKind::Connector);
        assert_eq!(inlet.component_index("mdot"), Some(0));
        assert_eq!(inlet.initial_value(Inlet1D::C_MDOT, 0), 0.35);
        assert_eq!(inlet.mass_fractions()[6], 1.0);
        assert!(inlet.set_grid(&[0.0, 0.1]).is_err());
    }

    #[test]
    fn outlet_requires_flow_on_the_left() {
        let outlet = Outlet1D::new(0.1, 9, 6);
        let layout = ff_oned::Layout::from_slots(vec![DomainSlot {
            loc: 0,
            n_components: 1,
            n_points: 1,
        }]);
        let x = [0.0];
        let ctx = EvalContext {
            x: &x,
            layout: &layout,
            index: 0,
        };
        let mut rsd = [0.0];
        let mut diag = [false];
        assert!(outlet.eval(&ctx, &mut rsd, &mut diag).is_err());
    }
}
