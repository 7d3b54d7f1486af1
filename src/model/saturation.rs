//! Saturated vapor pressure and density over ice.
//!
//! Polynomial-in-log-temperature fit; the coefficients are the published
//! values and must not be re-derived. The correlation is kept symbolic all
//! the way to emission: the exp/log calls land in the generated code and
//! evaluate there in double precision.

use pfmms_sym::Expr;

use crate::model::fields::PhysParams;

/// Reference temperature, in kelvin (-10 C).
pub const REFERENCE_TEMPERATURE: f64 = 263.0;

/// Fit coefficients for ln(P_vs): K0/T + K1 + K2 T + K3 T^2 + K4 T^3 + K5 ln(T).
const VAPOR_PRESSURE_FIT: [f64; 6] = [
    -0.58653696e4,
    0.2224103300e2,
    0.13749042e-1,
    -0.34031775e-4,
    0.26967687e-7,
    0.6918651,
];

/// Saturated vapor pressure at the given (symbolic or literal) temperature.
pub fn vapor_pressure(temperature: Expr) -> Expr {
    let mut ln_pressure = Expr::number(0.0);
    for (coefficient, power) in VAPOR_PRESSURE_FIT[..5]
        .iter()
        .zip([-1.0, 0.0, 1.0, 2.0, 3.0])
    {
        ln_pressure = ln_pressure + Expr::number(*coefficient) * temperature.pow(power);
    }
    (ln_pressure + Expr::number(VAPOR_PRESSURE_FIT[5]) * temperature.ln()).exp()
}

/// Saturation mixing ratio x_s = (R_da / R_v) * P_vs / (P_a - P_vs).
pub fn saturation_ratio(params: &PhysParams, temperature: Expr) -> Expr {
    let p_vs = vapor_pressure(temperature);
    params.r_da / params.r_v * (p_vs / (params.p_a - p_vs))
}

/// Saturated vapor density rho_vs = rho_a * x_s.
pub fn saturation_density(params: &PhysParams, temperature: Expr) -> Expr {
    params.rho_a * saturation_ratio(params, temperature)
}

/// Equilibrium vapor concentration u_eq = (rho_vs(T) - rho_vs(T_o)) / rho_i.
pub fn equilibrium_concentration(params: &PhysParams, temperature: Expr) -> Expr {
    let at_reference = saturation_density(params, Expr::number(REFERENCE_TEMPERATURE));
    (saturation_density(params, temperature) - at_reference) / params.rho_i
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfmms_sym::calculus::free_symbols;

    #[test]
    fn vapor_pressure_at_reference_is_parameter_free() {
        let p_vs = vapor_pressure(Expr::number(REFERENCE_TEMPERATURE));
        assert!(free_symbols(p_vs).is_empty());
    }

    #[test]
    fn vapor_pressure_keeps_log_term_symbolic() {
        let p_vs = vapor_pressure(Expr::number(REFERENCE_TEMPERATURE));
        // The polynomial part folds to a literal but exp/log stay calls.
        let text = p_vs.to_string();
        assert!(text.starts_with("exp("));
        assert!(text.contains("log(263)"));
    }

    #[test]
    fn equilibrium_concentration_uses_only_declared_symbols() {
        let params = PhysParams::new();
        let temperature = Expr::symbol("T");
        let u_eq = equilibrium_concentration(&params, temperature);
        let symbols = free_symbols(u_eq);
        for name in ["T", "R_da", "R_v", "P_a", "rho_a", "rho_i"] {
            assert!(symbols.contains(name), "missing {name}");
        }
        assert_eq!(symbols.len(), 6);
    }
}
