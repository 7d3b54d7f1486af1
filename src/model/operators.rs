//! Exact differential operators over the spatial and time symbols.

use nalgebra::Vector2;
use pfmms_sym::calculus::diff;
use pfmms_sym::Expr;

use crate::model::fields::Coords;

/// Ordered pair of first spatial partials.
pub fn gradient(field: Expr, coords: &Coords) -> Vector2<Expr> {
    Vector2::new(diff(field, coords.x), diff(field, coords.y))
}

/// Second partial of each gradient component with respect to its own
/// variable, summed.
pub fn laplacian(field: Expr, coords: &Coords) -> Expr {
    let grad = gradient(field, coords);
    diff(grad.x, coords.x) + diff(grad.y, coords.y)
}

pub fn time_derivative(field: Expr, coords: &Coords) -> Expr {
    diff(field, coords.t)
}
