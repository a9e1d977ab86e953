//! Reacting, ion-carrying flow between the inlet and the outlet.
//!
//! Unknowns per grid point: `velocity`, `T`, `eField`, `ePotential`, then one
//! mass fraction per species. Edge rows hold boundary defaults that the
//! connectors complete: the inlet adds its flux and inflow terms at the first
//! point, the outlet replaces the last point's temperature, species and
//! potential rows.
//!
//! The mass flux is an eigenvalue: the continuity row of the anchored point
//! is replaced by `T_j - T_fixed`, with forward differences upstream of it
//! and backward differences downstream.

use crate::error::{FlameError, FlameResult};
use crate::stage::SolveStage;
use ff_chem::{EquationOfState, Kinetics, TransportModel};
use ff_core::constants::{EPSILON_0, FARADAY};
use ff_core::numeric::linear_interp;
use ff_oned::{Domain, EvalContext, SolverError, SolverResult, validate_grid};

pub const C_VELOCITY: usize = 0;
pub const C_TEMPERATURE: usize = 1;
pub const C_EFIELD: usize = 2;
pub const C_EPOTENTIAL: usize = 3;
/// First species component.
pub const C_SPECIES: usize = 4;

/// Species closing the mass-fraction sum.
pub const BALANCE_SPECIES: &str = "N2";

const T_BOUNDS: (f64, f64) = (200.0, 6000.0);
const NEUTRAL_BOUNDS: (f64, f64) = (-1e-7, 1.0);
const CHARGED_BOUNDS: (f64, f64) = (-1e-14, 1.0);
const UNBOUNDED: (f64, f64) = (-1e20, 1e20);

pub struct IonFlow<'a> {
    eos: &'a dyn EquationOfState,
    kinetics: &'a dyn Kinetics,
    transport: &'a dyn TransportModel,
    pressure: f64,
    z: Vec<f64>,
    weights: Vec<f64>,
    /// Charge numbers, zero for neutrals
    charges: Vec<f64>,
    balance: usize,
    electron: Option<usize>,
    energy_enabled: bool,
    field_enabled: bool,
    stage: SolveStage,
    /// `(z, T)` of the anchored point
    fixed: Option<(f64, f64)>,
    /// Temperature imposed while the energy equation is off
    frozen_temperature: Option<(Vec<f64>, Vec<f64>)>,
}

impl<'a> IonFlow<'a> {
    pub fn new(
        eos: &'a dyn EquationOfState,
        kinetics: &'a dyn Kinetics,
        transport: &'a dyn TransportModel,
        pressure: f64,
        z: Vec<f64>,
    ) -> FlameResult<Self> {
        validate_grid(&z).map_err(|e| FlameError::contract(format!("flow grid: {e}")))?;
        let balance = eos.species_index(BALANCE_SPECIES).ok_or_else(|| {
            FlameError::contract(format!("mechanism lacks balance species {BALANCE_SPECIES}"))
        })?;
        Ok(Self {
            eos,
            kinetics,
            transport,
            pressure,
            z,
            weights: eos.molecular_weights().to_vec(),
            charges: eos.species().iter().map(|s| s.charge()).collect(),
            balance,
            electron: eos.species_index("E"),
            energy_enabled: false,
            field_enabled: false,
            stage: SolveStage::EnergyOnly,
            fixed: None,
            frozen_temperature: None,
        })
    }

    pub fn n_species(&self) -> usize {
        self.weights.len()
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn balance_species(&self) -> usize {
        self.balance
    }

    pub fn is_charged(&self, k: usize) -> bool {
        self.charges[k] != 0.0
    }

    pub fn set_fixed_temperature(&mut self, z: f64, t: f64) {
        self.fixed = Some((z, t));
    }

    pub fn fixed_temperature(&self) -> Option<(f64, f64)> {
        self.fixed
    }

    /// Index of the anchored point, matched by exact coordinate.
    pub fn fixed_point(&self) -> Option<usize> {
        let (zf, _) = self.fixed?;
        self.z.iter().position(|&zj| zj == zf)
    }

    pub fn energy_enabled(&self) -> bool {
        self.energy_enabled
    }

    pub fn set_energy_enabled(&mut self, on: bool) {
        self.energy_enabled = on;
    }

    /// Temperature profile held while the energy equation is off.
    pub fn set_frozen_temperature(&mut self, z: Vec<f64>, t: Vec<f64>) {
        self.frozen_temperature = Some((z, t));
    }

    pub fn field_enabled(&self) -> bool {
        self.field_enabled
    }

    pub fn set_field_enabled(&mut self, on: bool) {
        self.field_enabled = on;
    }

    pub fn stage(&self) -> SolveStage {
        self.stage
    }

    pub fn set_stage(&mut self, stage: SolveStage) -> FlameResult<()> {
        self.stage = self.stage.advance_to(stage)?;
        Ok(())
    }

    fn field_coupled(&self) -> bool {
        self.field_enabled && self.stage == SolveStage::FieldCoupled
    }

    /// Charge density [C/m³].
    fn charge_density(&self, rho: f64, y: &[f64]) -> f64 {
        let moles: f64 = y
            .iter()
            .zip(&self.charges)
            .zip(&self.weights)
            .map(|((yk, zk), wk)| zk * yk / wk)
            .sum();
        FARADAY * rho * moles
    }

    /// Mass fraction of electrons neutralising the cations in `y`.
    fn quasi_neutral_electrons(&self, e: usize, y: &[f64]) -> f64 {
        (0..self.n_species())
            .filter(|&k| self.charges[k] > 0.0)
            .map(|k| self.charges[k] * y[k] / self.weights[k])
            .sum::<f64>()
            * self.weights[e]
    }

    /// Species mass fluxes across the interval `[j, j+1]`.
    fn interval_fluxes(&self, pt: &[PointState], j: usize, out: &mut [f64]) {
        let ns = self.n_species();
        let (a, b) = (&pt[j], &pt[j + 1]);
        let dz = self.z[j + 1] - self.z[j];
        let t = 0.5 * (a.t + b.t);
        let rho = 0.5 * (a.rho + b.rho);
        let y: Vec<f64> = a.y.iter().zip(&b.y).map(|(ya, yb)| 0.5 * (ya + yb)).collect();
        let cp = self.eos.cp_mass(t, &y);

        let mut d = vec![0.0; ns];
        let mut mu = vec![0.0; ns];
        self.transport.mix_diff_coeffs(t, rho, cp, &mut d);
        self.transport.mobilities(t, rho, cp, &mut mu);

        let coupled = self.field_coupled();
        let e_mid = 0.5 * (a.e + b.e);
        for k in 0..ns {
            let grad = (b.y[k] - a.y[k]) / dz;
            out[k] = if !self.is_charged(k) {
                -rho * d[k] * grad
            } else if coupled {
                let v = self.charges[k].signum() * mu[k] * e_mid;
                let y_up = if v >= 0.0 { a.y[k] } else { b.y[k] };
                -rho * d[k] * grad + rho * y_up * v
            } else if self.charges[k] > 0.0 {
                // ambipolar
                -rho * 2.0 * d[k] * grad
            } else {
                0.0
            };
        }
        if !coupled && let Some(e) = self.electron {
            out[e] = (0..ns)
                .filter(|&k| self.charges[k] > 0.0)
                .map(|k| self.charges[k] * out[k] * self.weights[e] / self.weights[k])
                .sum();
        }

        let neutral_sum: f64 = (0..ns).filter(|&k| !self.is_charged(k)).map(|k| out[k]).sum();
        for k in (0..ns).filter(|&k| !self.is_charged(k)) {
            out[k] -= y[k] * neutral_sum;
        }
    }

    fn eval_continuity(&self, ctx: &EvalContext<'_>, pt: &[PointState], rsd: &mut [f64]) -> SolverResult<()> {
        let slot = ctx.slot();
        let (jf, t_fix) = match (self.fixed_point(), self.fixed) {
            (Some(jf), Some((_, t))) => (jf, t),
            _ => {
                return Err(SolverError::ProblemSetup {
                    what: "flow has no fixed-temperature point".to_string(),
                });
            }
        };
        for j in 0..slot.n_points {
            rsd[slot.index(C_VELOCITY, j)] = if j < jf {
                -(pt[j + 1].rho * pt[j + 1].u - pt[j].rho * pt[j].u) / (self.z[j + 1] - self.z[j])
            } else if j == jf {
                pt[j].t - t_fix
            } else {
                -(pt[j].rho * pt[j].u - pt[j - 1].rho * pt[j - 1].u) / (self.z[j] - self.z[j - 1])
            };
        }
        Ok(())
    }

    fn eval_field(&self, ctx: &EvalContext<'_>, pt: &[PointState], rsd: &mut [f64]) {
        let slot = ctx.slot();
        let last = slot.n_points - 1;
        let coupled = self.field_coupled();
        for j in 0..=last {
            let ke = slot.index(C_EFIELD, j);
            let kp = slot.index(C_EPOTENTIAL, j);
            if !coupled {
                rsd[ke] = pt[j].e;
                rsd[kp] = pt[j].phi;
                continue;
            }
            rsd[ke] = if j == 0 {
                pt[0].e
            } else {
                let q = 0.5 * (self.charge_density(pt[j].rho, &pt[j].y) + self.charge_density(pt[j - 1].rho, &pt[j - 1].y));
                (pt[j].e - pt[j - 1].e) / (self.z[j] - self.z[j - 1]) - q / EPSILON_0
            };
            rsd[kp] = if j == last {
                pt[j].phi
            } else {
                (pt[j + 1].phi - pt[j].phi) / (self.z[j + 1] - self.z[j]) + 0.5 * (pt[j].e + pt[j + 1].e)
            };
        }
    }

    fn frozen_temperature_at(&self, z: f64) -> SolverResult<f64> {
        let (zs, ts) = self.frozen_temperature.as_ref().ok_or_else(|| SolverError::ProblemSetup {
            what: "energy equation is off but no temperature profile is set".to_string(),
        })?;
        Ok(linear_interp(z, zs, ts)?)
    }
}

/// Primitive state at one grid point.
struct PointState {
    u: f64,
    t: f64,
    e: f64,
    phi: f64,
    y: Vec<f64>,
    rho: f64,
}

impl Domain for IonFlow<'_> {
    fn name(&self) -> &str {
        "flow"
    }

    fn n_components(&self) -> usize {
        C_SPECIES + self.n_species()
    }

    fn component_name(&self, n: usize) -> String {
        match n {
            C_VELOCITY => "velocity".to_string(),
            C_TEMPERATURE => "T".to_string(),
            C_EFIELD => "eField".to_string(),
            C_EPOTENTIAL => "ePotential".to_string(),
            _ => self.eos.species()[n - C_SPECIES].key().to_string(),
        }
    }

    fn bounds(&self, n: usize) -> (f64, f64) {
        match n {
            C_TEMPERATURE => T_BOUNDS,
            C_VELOCITY | C_EFIELD | C_EPOTENTIAL => UNBOUNDED,
            _ if self.is_charged(n - C_SPECIES) => CHARGED_BOUNDS,
            _ => NEUTRAL_BOUNDS,
        }
    }

    fn tolerances(&self, n: usize, _transient: bool) -> (f64, f64) {
        if n >= C_SPECIES && self.is_charged(n - C_SPECIES) {
            (1e-4, 1e-20)
        } else {
            (1e-4, 1e-9)
        }
    }

    fn grid(&self) -> &[f64] {
        &self.z
    }

    fn set_grid(&mut self, z: &[f64]) -> SolverResult<()> {
        validate_grid(z)?;
        self.z = z.to_vec();
        Ok(())
    }

    fn refine_active(&self, n: usize) -> bool {
        match n {
            C_VELOCITY | C_TEMPERATURE => true,
            C_EFIELD | C_EPOTENTIAL => false,
            _ => !self.is_charged(n - C_SPECIES),
        }
    }

    fn initial_value(&self, n: usize, _j: usize) -> f64 {
        match n {
            C_TEMPERATURE => 300.0,
            _ if n >= C_SPECIES && n - C_SPECIES == self.balance => 1.0,
            _ => 0.0,
        }
    }

    fn eval(&self, ctx: &EvalContext<'_>, rsd: &mut [f64], diag: &mut [bool]) -> SolverResult<()> {
        let slot = ctx.slot();
        let np = slot.n_points;
        let ns = self.n_species();
        let last = np - 1;

        let pt: Vec<PointState> = (0..np)
            .map(|j| {
                let y: Vec<f64> = (0..ns).map(|k| ctx.value(C_SPECIES + k, j)).collect();
                let t = ctx.value(C_TEMPERATURE, j);
                PointState {
                    u: ctx.value(C_VELOCITY, j),
                    t,
                    e: ctx.value(C_EFIELD, j),
                    phi: ctx.value(C_EPOTENTIAL, j),
                    rho: self.eos.density(t, self.pressure, &y),
                    y,
                }
            })
            .collect();

        let mut flux = vec![vec![0.0; ns]; np - 1];
        for (j, f) in flux.iter_mut().enumerate() {
            self.interval_fluxes(&pt, j, f);
        }

        self.eval_continuity(ctx, &pt, rsd)?;
        self.eval_field(ctx, &pt, rsd);

        let coupled = self.field_coupled();
        let mut wdot = vec![0.0; ns];
        let mut h = vec![0.0; ns];
        for j in 0..=last {
            let p = &pt[j];
            let kt = slot.index(C_TEMPERATURE, j);

            if j == 0 || j == last {
                rsd[kt] = p.t;
                for k in 0..ns {
                    let row = slot.index(C_SPECIES + k, j);
                    rsd[row] = if k == self.balance {
                        1.0 - p.y.iter().sum::<f64>()
                    } else if !coupled && Some(k) == self.electron {
                        p.y[k] - self.quasi_neutral_electrons(k, &p.y)
                    } else if j == 0 {
                        -(flux[0][k] + p.rho * p.u * p.y[k])
                    } else {
                        p.y[k]
                    };
                }
                continue;
            }

            let dz_l = self.z[j] - self.z[j - 1];
            let dz_r = self.z[j + 1] - self.z[j];
            let dz_avg = 0.5 * (self.z[j + 1] - self.z[j - 1]);
            let upwind = |c: usize| -> f64 {
                if p.u > 0.0 {
                    (ctx.value(c, j) - ctx.value(c, j - 1)) / dz_l
                } else {
                    (ctx.value(c, j + 1) - ctx.value(c, j)) / dz_r
                }
            };
            self.kinetics.net_production_rates(p.t, self.pressure, &p.y, &mut wdot);

            if self.energy_enabled {
                let cp = self.eos.cp_mass(p.t, &p.y);
                let cond = |a: &PointState, b: &PointState| {
                    let tm = 0.5 * (a.t + b.t);
                    let ym: Vec<f64> = a.y.iter().zip(&b.y).map(|(x, y)| 0.5 * (x + y)).collect();
                    self.transport.thermal_conductivity(tm, self.eos.cp_mass(tm, &ym))
                };
                let q_r = cond(p, &pt[j + 1]) * (pt[j + 1].t - p.t) / dz_r;
                let q_l = cond(&pt[j - 1], p) * (p.t - pt[j - 1].t) / dz_l;
                self.eos.molar_enthalpies(p.t, &mut h);
                let heat_release: f64 = h.iter().zip(&wdot).map(|(hk, wk)| hk * wk).sum();
                rsd[kt] = (-p.rho * p.u * cp * upwind(C_TEMPERATURE) + (q_r - q_l) / dz_avg - heat_release) / (p.rho * cp);
                diag[kt] = true;
            } else {
                rsd[kt] = p.t - self.frozen_temperature_at(self.z[j])?;
            }

            for k in 0..ns {
                let row = slot.index(C_SPECIES + k, j);
                if k == self.balance {
                    rsd[row] = 1.0 - p.y.iter().sum::<f64>();
                } else if !coupled && Some(k) == self.electron {
                    rsd[row] = p.y[k] - self.quasi_neutral_electrons(k, &p.y);
                } else {
                    rsd[row] = (-p.rho * p.u * upwind(C_SPECIES + k) - (flux[j][k] - flux[j - 1][k]) / dz_avg
                        + self.weights[k] * wdot[k])
                        / p.rho;
                    diag[row] = true;
                }
            }
        }
        Ok(())
    }
}
