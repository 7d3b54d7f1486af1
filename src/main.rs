use std::collections::HashMap;
use std::process;

use pfmms::model::equation::{phase_evolution_terms, SourceForm};
use pfmms::model::fields::{self, Coords, PhysParams};
use pfmms::model::saturation::equilibrium_concentration;
use pfmms_codegen::{CFunction, CSource};
use pfmms_sym::eval::eval;

/// Every symbol the derivation is allowed to mention, sorted by name.
/// Emission fails if the forcing term leaks anything else.
fn declared_parameters() -> Vec<String> {
    [
        "P_a", "R_da", "R_v", "lambda", "rho_a", "rho_i", "t", "tau", "w", "x", "y",
    ]
    .map(String::from)
    .to_vec()
}

/// Sample point used during development to sanity-check the equilibrium
/// concentration: unit coordinates, standard air/ice properties.
fn sample_bindings() -> HashMap<String, f64> {
    [
        ("x", 1.0),
        ("y", 1.0),
        ("t", 1.0),
        ("rho_a", 1.341),
        ("rho_i", 918.9),
        ("P_a", 101325.0),
        ("R_da", 287.058),
        ("R_v", 461.5),
    ]
    .map(|(name, value)| (name.to_string(), value))
    .into_iter()
    .collect()
}

fn main() {
    let coords = Coords::new();
    let params = PhysParams::new();

    println!("T = {}", fields::temperature_field(&coords));
    println!("u = {}", fields::concentration_field(&coords));
    println!("phi = {}", fields::phase_field(&coords));

    let terms = phase_evolution_terms(&coords, &params);
    let forcing = terms.forcing_term(SourceForm::Full);
    println!();
    println!("forcing term = {}", forcing);

    let u_eq = equilibrium_concentration(&params, fields::temperature_field(&coords));
    match eval(u_eq, &sample_bindings()) {
        Ok(value) => {
            println!();
            println!("u_eq at the sample point = {:e}", value);
        }
        Err(err) => {
            eprintln!("evaluation failed: {}", err);
            process::exit(1);
        }
    }

    let mut source = CSource::new();
    for (name, body) in [("forcing_term", forcing), ("coupling_term", terms.coupling)] {
        match CFunction::with_params(name, declared_parameters(), body) {
            Ok(function) => source.push(function),
            Err(err) => {
                eprintln!("codegen failed: {}", err);
                process::exit(1);
            }
        }
    }
    println!();
    println!("{}", source.to_c());
}
