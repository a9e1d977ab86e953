//! Inlet, flow and outlet bound into one problem.

use crate::boundary::{Inlet1D, Outlet1D};
use crate::context::RunContext;
use crate::error::{FlameError, FlameResult};
use crate::flow::IonFlow;
use crate::mixture::MixtureState;
use ff_oned::{Domain, DomainSet, validate_grid};

pub const INLET_DOMAIN: usize = 0;
pub const FLOW_DOMAIN: usize = 1;
pub const OUTLET_DOMAIN: usize = 2;

/// One member of the domain set, tagged by role.
pub enum FlameDomain<'a> {
    Inlet(Inlet1D<'a>),
    Flow(IonFlow<'a>),
    Outlet(Outlet1D),
}

impl FlameDomain<'_> {
    pub fn role(&self) -> &'static str {
        match self {
            FlameDomain::Inlet(_) => "inlet",
            FlameDomain::Flow(_) => "flow",
            FlameDomain::Outlet(_) => "outlet",
        }
    }
}

/// The three domains in solve order.
pub struct FlameDomains<'a> {
    pub inlet: Inlet1D<'a>,
    pub flow: IonFlow<'a>,
    pub outlet: Outlet1D,
}

impl<'a> FlameDomains<'a> {
    /// Accepts exactly `[Inlet, Flow, Outlet]`, with the connectors sitting
    /// on the ends of the flow grid.
    pub fn from_parts(parts: Vec<FlameDomain<'a>>) -> FlameResult<Self> {
        let roles: Vec<&str> = parts.iter().map(FlameDomain::role).collect();
        let mut it = parts.into_iter();
        let (Some(FlameDomain::Inlet(inlet)), Some(FlameDomain::Flow(flow)), Some(FlameDomain::Outlet(outlet)), None) =
            (it.next(), it.next(), it.next(), it.next())
        else {
            return Err(FlameError::contract(format!(
                "domains must be [inlet, flow, outlet], got {roles:?}"
            )));
        };

        let z = flow.grid();
        let (Some(&z0), Some(&zl)) = (z.first(), z.last()) else {
            return Err(FlameError::contract("flow grid is empty"));
        };
        if inlet.grid() != [z0].as_slice() || outlet.grid() != [zl].as_slice() {
            return Err(FlameError::contract(
                "boundaries must sit on the ends of the flow grid",
            ));
        }
        Ok(Self { inlet, flow, outlet })
    }
}

impl DomainSet for FlameDomains<'_> {
    fn n_domains(&self) -> usize {
        3
    }

    fn domain(&self, i: usize) -> &dyn Domain {
        debug_assert!(i < self.n_domains(), "flame domain index {i} out of range");
        match i {
            INLET_DOMAIN => &self.inlet,
            FLOW_DOMAIN => &self.flow,
            OUTLET_DOMAIN => &self.outlet,
            _ => unreachable!("flame domain index {i} out of range"),
        }
    }

    fn domain_mut(&mut self, i: usize) -> &mut dyn Domain {
        debug_assert!(i < self.n_domains(), "flame domain index {i} out of range");
        match i {
            INLET_DOMAIN => &mut self.inlet,
            FLOW_DOMAIN => &mut self.flow,
            OUTLET_DOMAIN => &mut self.outlet,
            _ => unreachable!("flame domain index {i} out of range"),
        }
    }
}

/// Build the domains over `grid` for `mixture`, with no applied field.
pub fn assemble<'a>(ctx: &'a RunContext, mixture: &MixtureState, grid: Vec<f64>) -> FlameResult<FlameDomains<'a>> {
    validate_grid(&grid).map_err(|e| FlameError::contract(format!("initial grid: {e}")))?;
    let pressure = mixture.pressure.value;
    let (z0, zl) = (grid[0], grid[grid.len() - 1]);

    let flow = IonFlow::new(ctx.eos(), ctx.kinetics(), ctx.transport(), pressure, grid)?;
    let balance = flow.balance_species();

    let mut inlet = Inlet1D::new(ctx.eos(), pressure, z0, balance);
    inlet.set_mass_fractions(mixture.y_unburned.clone());
    inlet.set_mdot(mixture.mass_flux());
    inlet.set_temperature(mixture.temperature.value);
    inlet.set_e_field(0.0);

    let outlet = Outlet1D::new(zl, flow.n_species(), balance);

    FlameDomains::from_parts(vec![
        FlameDomain::Inlet(inlet),
        FlameDomain::Flow(flow),
        FlameDomain::Outlet(outlet),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use ff_chem::Solution;
    use ff_oned::uniform_grid;

    #[test]
    fn assembles_in_order() {
        let ctx = RunContext::new(RunConfig::default()).unwrap();
        let m = MixtureState::initialize(&ctx, 1.0).unwrap();
        let d = assemble(&ctx, &m, uniform_grid(6, 0.1).unwrap()).unwrap();
        assert_eq!(d.n_domains(), 3);
        assert_eq!(d.domain(INLET_DOMAIN).name(), "inlet");
        assert_eq!(d.domain(FLOW_DOMAIN).n_points(), 6);
        assert_eq!(d.outlet.grid(), &[0.1]);
        assert!((d.inlet.mdot() - m.mass_flux()).abs() < 1e-15);
        assert_eq!(d.inlet.e_field(), 0.0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn domain_index_past_outlet_panics() {
        let ctx = RunContext::new(RunConfig::default()).unwrap();
        let m = MixtureState::initialize(&ctx, 1.0).unwrap();
        let d = assemble(&ctx, &m, uniform_grid(6, 0.1).unwrap()).unwrap();
        let _ = d.domain(OUTLET_DOMAIN + 1);
    }

    #[test]
    fn rejects_malformed_grid() {
        let ctx = RunContext::new(RunConfig::default()).unwrap();
        let m = MixtureState::initialize(&ctx, 1.0).unwrap();
        assert!(matches!(
            assemble(&ctx, &m, vec![0.0, 0.05, 0.05, 0.1]),
            Err(FlameError::ContractViolation { .. })
        ));
        assert!(matches!(
            assemble(&ctx, &m, vec![0.0]),
            Err(FlameError::ContractViolation { .. })
        ));
    }

    #[test]
    fn rejects_wrong_order() {
        let sol = Solution::methane_ion();
        let tr = ff_chem::new_transport("Ion", sol.species()).unwrap();
        let flow = || IonFlow::new(sol.eos(), sol.kinetics(), tr.as_ref(), 101_325.0, vec![0.0, 0.1]).unwrap();
        let inlet = || Inlet1D::new(sol.eos(), 101_325.0, 0.0, 6);
        let outlet = || Outlet1D::new(0.1, 9, 6);

        let swapped = vec![
            FlameDomain::Flow(flow()),
            FlameDomain::Inlet(inlet()),
            FlameDomain::Outlet(outlet()),
        ];
        assert!(matches!(
            FlameDomains::from_parts(swapped),
            Err(FlameError::ContractViolation { .. })
        ));

        let extra = vec![
            FlameDomain::Inlet(inlet()),
            FlameDomain::Flow(flow()),
            FlameDomain::Outlet(outlet()),
            FlameDomain::Outlet(outlet()),
        ];
        assert!(FlameDomains::from_parts(extra).is_err());

        let misplaced = vec![
            FlameDomain::Inlet(Inlet1D::new(sol.eos(), 101_325.0, 0.05, 6)),
            FlameDomain::Flow(flow()),
            FlameDomain::Outlet(outlet()),
        ];
        assert!(FlameDomains::from_parts(misplaced).is_err());

        let ok = vec![
            FlameDomain::Inlet(inlet()),
            FlameDomain::Flow(flow()),
            FlameDomain::Outlet(outlet()),
        ];
        assert!(FlameDomains::from_parts(ok).is_ok());
    }
}
