//! Assembly of the phase evolution equation and its manufactured source.
//!
//! The governing equation (Kaempfer & Plapp 2009, eq. 33) reads
//!
//!   tau dphi/dt = w^2 lapl(phi) + (phi - phi^3) + lambda (u - u_eq) (1 - phi^2)^2
//!
//! so the source that makes the manufactured fields exact is the residual
//! of the left side minus the right side. The sign pattern below is fixed
//! by that equation and must not be re-derived.

use pfmms_sym::Expr;

use crate::model::fields::{self, Coords, PhysParams};
use crate::model::operators::{laplacian, time_derivative};
use crate::model::saturation::equilibrium_concentration;

/// Which terms participate in the manufactured source.
///
/// The reduced form drops the concentration coupling; useful when the
/// solver under verification runs the phase equation uncoupled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceForm {
    Full,
    WithoutCoupling,
}

impl SourceForm {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceForm::Full => "full",
            SourceForm::WithoutCoupling => "without-coupling",
        }
    }
}

/// The four named terms of the phase evolution equation, evaluated on the
/// manufactured fields.
#[derive(Debug, Clone, Copy)]
pub struct PhaseEvolutionTerms {
    /// tau * dphi/dt
    pub relaxation: Expr,
    /// w^2 * lapl(phi)
    pub diffusion: Expr,
    /// phi - phi^3
    pub potential: Expr,
    /// lambda * (u - u_eq) * (1 - phi^2)^2
    pub coupling: Expr,
}

pub fn phase_evolution_terms(coords: &Coords, params: &PhysParams) -> PhaseEvolutionTerms {
    let phi = fields::phase_field(coords);
    let u = fields::concentration_field(coords);
    let u_eq = equilibrium_concentration(params, fields::temperature_field(coords));

    PhaseEvolutionTerms {
        relaxation: params.tau * time_derivative(phi, coords),
        diffusion: params.w.pow(2.0) * laplacian(phi, coords),
        potential: phi - phi * phi * phi,
        coupling: params.lam * (u - u_eq) * (Expr::number(1.0) - phi * phi).pow(2.0),
    }
}

impl PhaseEvolutionTerms {
    /// Manufactured source term, with the sign convention of the governing
    /// equation: relaxation - diffusion - potential [- coupling].
    pub fn forcing_term(&self, form: SourceForm) -> Expr {
        let reduced = self.relaxation - self.diffusion - self.potential;
        match form {
            SourceForm::Full => reduced - self.coupling,
            SourceForm::WithoutCoupling => reduced,
        }
    }
}
