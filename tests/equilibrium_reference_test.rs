use std::collections::HashMap;

use pfmms::model::fields::PhysParams;
use pfmms::model::saturation::{equilibrium_concentration, REFERENCE_TEMPERATURE};
use pfmms_sym::calculus::free_symbols;
use pfmms_sym::eval::eval;
use pfmms_sym::Expr;

fn physical_bindings() -> HashMap<String, f64> {
    [
        ("R_da", 287.058),
        ("R_v", 461.5),
        ("P_a", 101325.0),
        ("rho_a", 1.341),
        ("rho_i", 918.9),
    ]
    .map(|(name, value)| (name.to_string(), value))
    .into_iter()
    .collect()
}

#[test]
fn equilibrium_concentration_vanishes_at_reference_temperature() {
    let params = PhysParams::new();
    let u_eq = equilibrium_concentration(&params, Expr::number(REFERENCE_TEMPERATURE));

    // Both correlation branches are the same computation, so the difference
    // must be exactly zero, not merely small.
    let value = eval(u_eq, &physical_bindings()).expect("all parameters bound");
    assert_eq!(value, 0.0);
}

#[test]
fn reference_substitution_leaves_only_gas_and_density_parameters() {
    let params = PhysParams::new();
    let u_eq = equilibrium_concentration(&params, Expr::number(REFERENCE_TEMPERATURE));

    let symbols = free_symbols(u_eq);
    let names: Vec<_> = symbols.iter().map(String::as_str).collect();
    for name in ["R_da", "R_v", "P_a", "rho_a", "rho_i"] {
        assert!(names.contains(&name), "missing {name}");
    }
    assert!(!names.contains(&"x"));
    assert!(!names.contains(&"y"));
    assert!(!names.contains(&"t"));
}
