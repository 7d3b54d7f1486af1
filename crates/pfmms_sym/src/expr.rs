//! Symbolic scalar expressions over named variables.
//!
//! Expressions are immutable trees held in a thread-local arena; `Expr` is a
//! cheap `Copy` handle into it. Construction goes through smart constructors
//! that fold numeric arithmetic and the usual algebraic identities, so trees
//! produced by repeated differentiation stay readable. Transcendental calls
//! are never folded, even for numeric arguments: evaluating them in double
//! precision belongs to the emitted code, not to the generator.

use std::cell::RefCell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Expr(u32);

#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Number(f64),
    Pi,
    Symbol(String),
    Unary {
        op: UnaryOp,
        arg: Expr,
    },
    Func {
        func: Func,
        arg: Expr,
    },
    Binary {
        left: Expr,
        op: BinaryOp,
        right: Expr,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Func {
    Exp,
    Ln,
    Sin,
    Cos,
}

impl Func {
    pub fn as_str(self) -> &'static str {
        match self {
            Func::Exp => "exp",
            Func::Ln => "log",
            Func::Sin => "sin",
            Func::Cos => "cos",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

thread_local! {
    static EXPR_ARENA: RefCell<Vec<ExprNode>> = RefCell::new(Vec::new());
}

impl Expr {
    fn alloc(node: ExprNode) -> Self {
        EXPR_ARENA.with(|arena| {
            let mut arena = arena.borrow_mut();
            let id = u32::try_from(arena.len()).expect("expression arena overflow");
            arena.push(node);
            Expr(id)
        })
    }

    fn with_node<R>(self, f: impl FnOnce(&ExprNode) -> R) -> R {
        EXPR_ARENA.with(|arena| {
            let arena = arena.borrow();
            let node = arena
                .get(self.0 as usize)
                .unwrap_or_else(|| panic!("invalid Expr id {}", self.0));
            f(node)
        })
    }

    /// Owned copy of this expression's root node, for traversal by callers
    /// that build new expressions while walking (differentiation, lowering).
    pub fn node(self) -> ExprNode {
        self.with_node(|node| node.clone())
    }

    pub fn number(value: f64) -> Self {
        Expr::alloc(ExprNode::Number(value))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::alloc(ExprNode::Symbol(name.into()))
    }

    pub fn pi() -> Self {
        Expr::alloc(ExprNode::Pi)
    }

    pub fn as_number(self) -> Option<f64> {
        self.with_node(|node| match node {
            ExprNode::Number(value) => Some(*value),
            _ => None,
        })
    }

    pub fn symbol_name(self) -> Option<String> {
        self.with_node(|node| match node {
            ExprNode::Symbol(name) => Some(name.clone()),
            _ => None,
        })
    }

    fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        if let Some(folded) = fold_binary(left, op, right) {
            return folded;
        }
        Expr::alloc(ExprNode::Binary { left, op, right })
    }

    fn func(func: Func, arg: Expr) -> Self {
        Expr::alloc(ExprNode::Func { func, arg })
    }

    pub fn neg(self) -> Self {
        if let Some(value) = self.as_number() {
            return Expr::number(-value);
        }
        let inner = self.with_node(|node| match node {
            ExprNode::Unary {
                op: UnaryOp::Neg,
                arg,
            } => Some(*arg),
            _ => None,
        });
        if let Some(inner) = inner {
            return inner;
        }
        Expr::alloc(ExprNode::Unary {
            op: UnaryOp::Neg,
            arg: self,
        })
    }

    pub fn pow(self, exponent: impl Into<Expr>) -> Self {
        Expr::binary(self, BinaryOp::Pow, exponent.into())
    }

    pub fn exp(self) -> Self {
        Expr::func(Func::Exp, self)
    }

    pub fn ln(self) -> Self {
        Expr::func(Func::Ln, self)
    }

    pub fn sin(self) -> Self {
        Expr::func(Func::Sin, self)
    }

    pub fn cos(self) -> Self {
        Expr::func(Func::Cos, self)
    }
}

fn fold_binary(left: Expr, op: BinaryOp, right: Expr) -> Option<Expr> {
    let lhs = left.as_number();
    let rhs = right.as_number();
    match op {
        BinaryOp::Add => {
            if lhs == Some(0.0) {
                return Some(right);
            }
            if rhs == Some(0.0) {
                return Some(left);
            }
            if let (Some(a), Some(b)) = (lhs, rhs) {
                return Some(Expr::number(a + b));
            }
        }
        BinaryOp::Sub => {
            if rhs == Some(0.0) {
                return Some(left);
            }
            if let (Some(a), Some(b)) = (lhs, rhs) {
                return Some(Expr::number(a - b));
            }
            if lhs == Some(0.0) {
                return Some(right.neg());
            }
        }
        BinaryOp::Mul => {
            if lhs == Some(0.0) || rhs == Some(0.0) {
                return Some(Expr::number(0.0));
            }
            if lhs == Some(1.0) {
                return Some(right);
            }
            if rhs == Some(1.0) {
                return Some(left);
            }
            if lhs == Some(-1.0) {
                return Some(right.neg());
            }
            if rhs == Some(-1.0) {
                return Some(left.neg());
            }
            if let (Some(a), Some(b)) = (lhs, rhs) {
                return Some(Expr::number(a * b));
            }
        }
        BinaryOp::Div => {
            if rhs == Some(1.0) {
                return Some(left);
            }
            if rhs == Some(-1.0) {
                return Some(left.neg());
            }
            if lhs == Some(0.0) && rhs != Some(0.0) {
                return Some(Expr::number(0.0));
            }
            if let (Some(a), Some(b)) = (lhs, rhs) {
                if b != 0.0 {
                    return Some(Expr::number(a / b));
                }
            }
        }
        BinaryOp::Pow => {
            if rhs == Some(1.0) {
                return Some(left);
            }
            if rhs == Some(0.0) {
                return Some(Expr::number(1.0));
            }
            if lhs == Some(1.0) {
                return Some(Expr::number(1.0));
            }
            if let (Some(a), Some(b)) = (lhs, rhs) {
                let value = a.powf(b);
                if value.is_finite() {
                    return Some(Expr::number(value));
                }
            }
        }
    }
    None
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::number(value)
    }
}

impl std::ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Self::Output {
        Expr::binary(self, BinaryOp::Add, rhs)
    }
}

impl std::ops::Add<f64> for Expr {
    type Output = Expr;

    fn add(self, rhs: f64) -> Self::Output {
        self + Expr::from(rhs)
    }
}

impl std::ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Self::Output {
        Expr::binary(self, BinaryOp::Sub, rhs)
    }
}

impl std::ops::Sub<f64> for Expr {
    type Output = Expr;

    fn sub(self, rhs: f64) -> Self::Output {
        self - Expr::from(rhs)
    }
}

impl std::ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Self::Output {
        Expr::binary(self, BinaryOp::Mul, rhs)
    }
}

impl std::ops::Mul<f64> for Expr {
    type Output = Expr;

    fn mul(self, rhs: f64) -> Self::Output {
        self * Expr::from(rhs)
    }
}

impl std::ops::Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Self::Output {
        Expr::binary(self, BinaryOp::Div, rhs)
    }
}

impl std::ops::Div<f64> for Expr {
    type Output = Expr;

    fn div(self, rhs: f64) -> Self::Output {
        self / Expr::from(rhs)
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        Expr::neg(self)
    }
}

impl BinaryOp {
    fn precedence(self) -> Precedence {
        match self {
            BinaryOp::Add | BinaryOp::Sub => Precedence::Sum,
            BinaryOp::Mul | BinaryOp::Div => Precedence::Product,
            BinaryOp::Pow => Precedence::Power,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Pow => write!(f, "^"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Sum,
    Product,
    Prefix,
    Power,
    Postfix,
}

fn next_precedence(prec: Precedence) -> Precedence {
    match prec {
        Precedence::Lowest => Precedence::Sum,
        Precedence::Sum => Precedence::Product,
        Precedence::Product => Precedence::Prefix,
        Precedence::Prefix => Precedence::Power,
        Precedence::Power | Precedence::Postfix => Precedence::Postfix,
    }
}

fn expr_precedence(expr: Expr) -> Precedence {
    expr.with_node(|node| match node {
        ExprNode::Number(value) if *value < 0.0 => Precedence::Prefix,
        ExprNode::Number(_) | ExprNode::Pi | ExprNode::Symbol(_) | ExprNode::Func { .. } => {
            Precedence::Postfix
        }
        ExprNode::Unary { .. } => Precedence::Prefix,
        ExprNode::Binary { op, .. } => op.precedence(),
    })
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_expr(*self, f, Precedence::Lowest)
    }
}

fn render_expr(expr: Expr, f: &mut fmt::Formatter<'_>, parent_prec: Precedence) -> fmt::Result {
    expr.with_node(|node| match node {
        ExprNode::Number(value) => write!(f, "{}", value),
        ExprNode::Pi => write!(f, "pi"),
        ExprNode::Symbol(name) => write!(f, "{}", name),
        ExprNode::Unary {
            op: UnaryOp::Neg,
            arg,
        } => {
            let prec = Precedence::Prefix;
            let needs_paren = prec < parent_prec;
            if needs_paren {
                write!(f, "(")?;
            }
            write!(f, "-")?;
            render_expr(*arg, f, prec)?;
            if needs_paren {
                write!(f, ")")?;
            }
            Ok(())
        }
        ExprNode::Func { func, arg } => {
            write!(f, "{}(", func.as_str())?;
            render_expr(*arg, f, Precedence::Lowest)?;
            write!(f, ")")
        }
        ExprNode::Binary {
            left,
            op: BinaryOp::Pow,
            right,
        } => {
            let prec = Precedence::Power;
            let outer_paren = prec < parent_prec;
            if outer_paren {
                write!(f, "(")?;
            }
            let base_paren = expr_precedence(*left) < Precedence::Postfix;
            if base_paren {
                write!(f, "(")?;
            }
            render_expr(*left, f, Precedence::Postfix)?;
            if base_paren {
                write!(f, ")")?;
            }
            write!(f, "^")?;
            let exp_paren = expr_precedence(*right) < prec;
            if exp_paren {
                write!(f, "(")?;
            }
            render_expr(*right, f, prec)?;
            if exp_paren {
                write!(f, ")")?;
            }
            if outer_paren {
                write!(f, ")")?;
            }
            Ok(())
        }
        ExprNode::Binary { left, op, right } => {
            let prec = op.precedence();
            let needs_paren = prec < parent_prec;
            if needs_paren {
                write!(f, "(")?;
            }
            render_expr(*left, f, prec)?;
            write!(f, " {} ", op)?;
            // Subtraction and division are not associative; preserve RHS grouping.
            let right_prec = match op {
                BinaryOp::Sub | BinaryOp::Div => next_precedence(prec),
                _ => prec,
            };
            render_expr(*right, f, right_prec)?;
            if needs_paren {
                write!(f, ")")?;
            }
            Ok(())
        }
    })
}
