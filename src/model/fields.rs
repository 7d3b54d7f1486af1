//! Manufactured analytic fields and the symbols they are written in.
//!
//! The fields are design choices, not derived quantities: smooth closed
//! forms compatible with the periodic boundary assumptions of the solver
//! under verification. Symbols live in plain structs passed between pure
//! functions; there is no process-wide symbol table.

use pfmms_sym::Expr;

/// Spatial coordinates and time.
#[derive(Debug, Clone, Copy)]
pub struct Coords {
    pub x: Expr,
    pub y: Expr,
    pub t: Expr,
}

impl Coords {
    pub fn new() -> Self {
        Self {
            x: Expr::symbol("x"),
            y: Expr::symbol("y"),
            t: Expr::symbol("t"),
        }
    }
}

impl Default for Coords {
    fn default() -> Self {
        Self::new()
    }
}

/// Physical parameters of the phase evolution equation, kept symbolic so
/// the generated source term stays parametric in all of them.
#[derive(Debug, Clone, Copy)]
pub struct PhysParams {
    /// Interface thickness.
    pub w: Expr,
    /// Phase relaxation time constant.
    pub tau: Expr,
    /// Phase coupling constant related to the capillary length.
    pub lam: Expr,
    /// Specific gas constant of dry air.
    pub r_da: Expr,
    /// Specific gas constant of water vapor.
    pub r_v: Expr,
    /// Ambient pressure.
    pub p_a: Expr,
    /// Air density.
    pub rho_a: Expr,
    /// Ice density.
    pub rho_i: Expr,
}

impl PhysParams {
    pub fn new() -> Self {
        Self {
            w: Expr::symbol("w"),
            tau: Expr::symbol("tau"),
            lam: Expr::symbol("lambda"),
            r_da: Expr::symbol("R_da"),
            r_v: Expr::symbol("R_v"),
            p_a: Expr::symbol("P_a"),
            rho_a: Expr::symbol("rho_a"),
            rho_i: Expr::symbol("rho_i"),
        }
    }
}

impl Default for PhysParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Vapor concentration field: u = sin(4 x y).
pub fn concentration_field(coords: &Coords) -> Expr {
    (Expr::number(4.0) * coords.x * coords.y).sin()
}

/// Temperature field: T = 100 x y.
pub fn temperature_field(coords: &Coords) -> Expr {
    Expr::number(100.0) * coords.x * coords.y
}

/// Phase order parameter: phi = t sin(4 pi x) sin(4 pi y).
pub fn phase_field(coords: &Coords) -> Expr {
    coords.t
        * (Expr::number(4.0) * Expr::pi() * coords.x).sin()
        * (Expr::number(4.0) * Expr::pi() * coords.y).sin()
}
