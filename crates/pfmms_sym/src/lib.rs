//! Symbolic expression core for the manufactured-solution generator.

pub mod calculus;
pub mod eval;
pub mod expr;

pub use expr::Expr;
