use ff_chem::{EquationOfState, EquilibriumConstraint, GasState, Solution};
use ff_core::units::{k, pa};

fn adiabatic(phi: f64) -> (f64, Vec<f64>) {
    let sol = Solution::methane_ion();
    let x = sol
        .mixture_for_equivalence_ratio(phi, "CH4", "O2:0.21,N2:0.79")
        .unwrap();
    let state = GasState {
        temperature: k(300.0),
        pressure: pa(101_325.0),
        x,
    };
    let burned = sol.eos().equilibrate(&state, EquilibriumConstraint::HP).unwrap();
    (burned.temperature.value, burned.x)
}

#[test]
fn stoichiometric_methane_air_temperature() {
    let (t_ad, x) = adiabatic(1.0);
    assert!(t_ad > 2000.0 && t_ad < 2400.0, "T_ad = {t_ad}");
    let sum: f64 = x.iter().sum();
    assert!((sum - 1.0).abs() < 1e-9);
}

#[test]
fn lean_methane_air_temperature() {
    let (t_ad, x) = adiabatic(0.6);
    assert!(t_ad > 1500.0 && t_ad < 1800.0, "T_ad = {t_ad}");
    // excess oxygen survives, fuel does not
    assert!(x[1] > 0.05);
    assert!(x[0] < 1e-8);
}

#[test]
fn enthalpy_is_conserved() {
    let sol = Solution::methane_ion();
    let x0 = sol
        .mixture_for_equivalence_ratio(0.8, "CH4", "O2:0.21,N2:0.79")
        .unwrap();
    let state = GasState {
        temperature: k(300.0),
        pressure: pa(101_325.0),
        x: x0.clone(),
    };
    let burned = sol.eos().equilibrate(&state, EquilibriumConstraint::HP).unwrap();
    let y0 = sol.eos().mole_to_mass(&x0);
    let y1 = sol.eos().mole_to_mass(&burned.x);
    let h0 = sol.eos().enthalpy_mass(300.0, &y0);
    let h1 = sol.eos().enthalpy_mass(burned.temperature.value, &y1);
    assert!((h0 - h1).abs() < 1e-3 * h0.abs().max(1e4), "h0={h0} h1={h1}");
}

#[test]
fn ions_stay_out_of_equilibrium() {
    let (_, x) = adiabatic(1.0);
    assert_eq!(x[7], 0.0);
    assert_eq!(x[8], 0.0);
}
