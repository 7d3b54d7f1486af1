//! Exact symbolic differentiation and free-variable queries.
//!
//! Derivatives are exact: no finite-difference approximation enters the
//! generated expressions. Truncation error belongs to the numerical solver
//! under verification, not to the generator.

use indexmap::IndexSet;

use crate::expr::{BinaryOp, Expr, ExprNode, Func, UnaryOp};

/// First partial derivative of `expr` with respect to `var`.
///
/// `var` must be a bare symbol (the same handle style sympy's `diff` takes);
/// anything else is a programming error and panics.
pub fn diff(expr: Expr, var: Expr) -> Expr {
    let name = var
        .symbol_name()
        .unwrap_or_else(|| panic!("differentiation variable must be a bare symbol, got {var}"));
    diff_named(expr, &name)
}

fn diff_named(expr: Expr, var: &str) -> Expr {
    match expr.node() {
        ExprNode::Number(_) | ExprNode::Pi => Expr::number(0.0),
        ExprNode::Symbol(name) => Expr::number(if name == var { 1.0 } else { 0.0 }),
        ExprNode::Unary {
            op: UnaryOp::Neg,
            arg,
        } => diff_named(arg, var).neg(),
        ExprNode::Func { func, arg } => {
            let outer = match func {
                Func::Exp => arg.exp(),
                Func::Ln => Expr::number(1.0) / arg,
                Func::Sin => arg.cos(),
                Func::Cos => arg.sin().neg(),
            };
            outer * diff_named(arg, var)
        }
        ExprNode::Binary { left, op, right } => match op {
            BinaryOp::Add => diff_named(left, var) + diff_named(right, var),
            BinaryOp::Sub => diff_named(left, var) - diff_named(right, var),
            BinaryOp::Mul => diff_named(left, var) * right + left * diff_named(right, var),
            BinaryOp::Div => {
                (diff_named(left, var) * right - left * diff_named(right, var)) / right.pow(2.0)
            }
            BinaryOp::Pow => {
                if depends_on(right, var) {
                    // General case: d(u^v) = u^v * (v' ln u + v u' / u).
                    left.pow(right)
                        * (diff_named(right, var) * left.ln()
                            + right * diff_named(left, var) / left)
                } else {
                    right * left.pow(right - 1.0) * diff_named(left, var)
                }
            }
        },
    }
}

/// Whether `symbol` occurs free anywhere in `expr`.
pub fn depends_on(expr: Expr, symbol: &str) -> bool {
    match expr.node() {
        ExprNode::Number(_) | ExprNode::Pi => false,
        ExprNode::Symbol(name) => name == symbol,
        ExprNode::Unary { arg, .. } | ExprNode::Func { arg, .. } => depends_on(arg, symbol),
        ExprNode::Binary { left, right, .. } => {
            depends_on(left, symbol) || depends_on(right, symbol)
        }
    }
}

/// All free symbols of `expr`, in deterministic first-occurrence order.
pub fn free_symbols(expr: Expr) -> IndexSet<String> {
    let mut symbols = IndexSet::new();
    collect_symbols(expr, &mut symbols);
    symbols
}

fn collect_symbols(expr: Expr, out: &mut IndexSet<String>) {
    match expr.node() {
        ExprNode::Number(_) | ExprNode::Pi => {}
        ExprNode::Symbol(name) => {
            out.insert(name);
        }
        ExprNode::Unary { arg, .. } | ExprNode::Func { arg, .. } => collect_symbols(arg, out),
        ExprNode::Binary { left, right, .. } => {
            collect_symbols(left, out);
            collect_symbols(right, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivative_of_unrelated_symbol_is_zero() {
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        assert_eq!(diff(y, x).as_number(), Some(0.0));
        assert_eq!(diff(x, x).as_number(), Some(1.0));
        assert_eq!(diff(Expr::pi(), x).as_number(), Some(0.0));
    }

    #[test]
    fn product_rule_folds_constant_factors() {
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        let expr = Expr::number(4.0) * x * y;
        assert_eq!(diff(expr, x).to_string(), "4 * y");
    }

    #[test]
    fn chain_rule_through_sin() {
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        let expr = (Expr::number(4.0) * x * y).sin();
        assert_eq!(diff(expr, x).to_string(), "cos(4 * x * y) * 4 * y");
    }

    #[test]
    fn exponential_and_log_rules() {
        let x = Expr::symbol("x");
        assert_eq!(diff(x.exp(), x).to_string(), "exp(x)");
        assert_eq!(diff(x.ln(), x).to_string(), "1 / x");
        assert_eq!(diff(x.cos(), x).to_string(), "-sin(x)");
    }

    #[test]
    fn power_rule_with_constant_exponent() {
        let x = Expr::symbol("x");
        assert_eq!(diff(x.pow(3.0), x).to_string(), "3 * x^2");
        assert_eq!(diff(x.pow(-1.0), x).to_string(), "-x^(-2)");
    }

    #[test]
    fn general_power_rule_when_exponent_varies() {
        let x = Expr::symbol("x");
        let derivative = diff(x.pow(x), x);
        assert_eq!(derivative.to_string(), "x^x * (log(x) + x / x)");
    }

    #[test]
    fn quotient_rule_shape() {
        let x = Expr::symbol("x");
        let a = Expr::symbol("a");
        let derivative = diff(a / x, x);
        assert_eq!(derivative.to_string(), "-a / x^2");
    }

    #[test]
    fn depends_on_sees_through_nesting() {
        let x = Expr::symbol("x");
        let t = Expr::symbol("t");
        let expr = (t * x.sin()).exp();
        assert!(depends_on(expr, "x"));
        assert!(depends_on(expr, "t"));
        assert!(!depends_on(expr, "y"));
    }

    #[test]
    fn free_symbols_preserve_first_occurrence_order() {
        let expr = Expr::symbol("tau") * Expr::symbol("x") + Expr::symbol("x") * Expr::symbol("w");
        let symbols: Vec<_> = free_symbols(expr).into_iter().collect();
        assert_eq!(symbols, ["tau", "x", "w"]);
    }

    #[test]
    #[should_panic(expected = "bare symbol")]
    fn diff_rejects_non_symbol_variable() {
        let x = Expr::symbol("x");
        diff(x, x + Expr::number(1.0));
    }
}
