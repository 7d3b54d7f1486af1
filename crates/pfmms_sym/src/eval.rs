//! Numeric evaluation of expression trees.

use std::collections::HashMap;
use std::fmt;

use crate::expr::{BinaryOp, Expr, ExprNode, Func, UnaryOp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    UnboundSymbol { name: String },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UnboundSymbol { name } => {
                write!(f, "expression references unbound symbol '{}'", name)
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Evaluate `expr` with every symbol bound through `bindings`.
pub fn eval(expr: Expr, bindings: &HashMap<String, f64>) -> Result<f64, EvalError> {
    match expr.node() {
        ExprNode::Number(value) => Ok(value),
        ExprNode::Pi => Ok(std::f64::consts::PI),
        ExprNode::Symbol(name) => bindings
            .get(&name)
            .copied()
            .ok_or(EvalError::UnboundSymbol { name }),
        ExprNode::Unary {
            op: UnaryOp::Neg,
            arg,
        } => Ok(-eval(arg, bindings)?),
        ExprNode::Func { func, arg } => {
            let value = eval(arg, bindings)?;
            Ok(match func {
                Func::Exp => value.exp(),
                Func::Ln => value.ln(),
                Func::Sin => value.sin(),
                Func::Cos => value.cos(),
            })
        }
        ExprNode::Binary { left, op, right } => {
            let lhs = eval(left, bindings)?;
            let rhs = eval(right, bindings)?;
            Ok(match op {
                BinaryOp::Add => lhs + rhs,
                BinaryOp::Sub => lhs - rhs,
                BinaryOp::Mul => lhs * rhs,
                BinaryOp::Div => lhs / rhs,
                BinaryOp::Pow => lhs.powf(rhs),
            })
        }
    }
}
