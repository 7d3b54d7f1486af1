//! C source emission for symbolic expression trees.
//!
//! Lowering is deterministic: the same expression renders to the same text,
//! and parameter lists are either caller-declared or derived from the free
//! symbols in sorted order. Functions come out in the shape a generated
//! verification kernel expects: a scalar `double` function of scalar
//! `double` arguments assigning a single result variable.

use std::fmt;

use pfmms_sym::calculus::free_symbols;
use pfmms_sym::expr::{BinaryOp, Expr, ExprNode, Func, UnaryOp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    UndeclaredSymbol { function: String, symbol: String },
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenError::UndeclaredSymbol { function, symbol } => write!(
                f,
                "function {}: expression references undeclared symbol '{}'",
                function, symbol
            ),
        }
    }
}

impl std::error::Error for CodegenError {}

#[derive(Debug, Clone)]
pub struct CFunction {
    name: String,
    params: Vec<String>,
    body: Expr,
}

impl CFunction {
    /// Scalar function whose parameters are the body's free symbols, sorted
    /// by name.
    pub fn scalar(name: impl Into<String>, body: Expr) -> Self {
        let mut params: Vec<String> = free_symbols(body).into_iter().collect();
        params.sort();
        Self {
            name: name.into(),
            params,
            body,
        }
    }

    /// Scalar function with a caller-declared parameter list.
    ///
    /// Every free symbol of the body must appear among the declared
    /// parameters; an unexpected symbol means the derivation leaked a
    /// variable and the generated code would not compile.
    pub fn with_params(
        name: impl Into<String>,
        params: Vec<String>,
        body: Expr,
    ) -> Result<Self, CodegenError> {
        let name = name.into();
        for symbol in free_symbols(body) {
            if !params.iter().any(|param| *param == symbol) {
                return Err(CodegenError::UndeclaredSymbol {
                    function: name,
                    symbol,
                });
            }
        }
        Ok(Self { name, params, body })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn to_c(&self) -> String {
        let mut signature = String::new();
        if self.params.is_empty() {
            signature.push_str("void");
        } else {
            for (idx, param) in self.params.iter().enumerate() {
                if idx > 0 {
                    signature.push_str(", ");
                }
                signature.push_str("double ");
                signature.push_str(param);
            }
        }
        format!(
            "double {name}({signature}) {{\n   double {name}_result;\n   {name}_result = {body};\n   return {name}_result;\n}}\n",
            name = self.name,
            signature = signature,
            body = CExpr(self.body),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct CSource {
    functions: Vec<CFunction>,
}

impl CSource {
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
        }
    }

    pub fn push(&mut self, function: CFunction) {
        self.functions.push(function);
    }

    pub fn functions(&self) -> &[CFunction] {
        &self.functions
    }

    pub fn to_c(&self) -> String {
        let mut out = String::from("#include <math.h>\n");
        for function in &self.functions {
            out.push('\n');
            out.push_str(&function.to_c());
        }
        out
    }
}

/// Display adapter rendering an expression as a C expression.
#[derive(Debug, Clone, Copy)]
pub struct CExpr(pub Expr);

impl fmt::Display for CExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_expr(self.0, f, Precedence::Lowest)
    }
}

pub fn expr_to_c(expr: Expr) -> String {
    CExpr(expr).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Sum,
    Product,
    Prefix,
    Postfix,
}

fn next_precedence(prec: Precedence) -> Precedence {
    match prec {
        Precedence::Lowest => Precedence::Sum,
        Precedence::Sum => Precedence::Product,
        Precedence::Product => Precedence::Prefix,
        Precedence::Prefix | Precedence::Postfix => Precedence::Postfix,
    }
}

fn binary_precedence(op: BinaryOp) -> Precedence {
    match op {
        BinaryOp::Add | BinaryOp::Sub => Precedence::Sum,
        BinaryOp::Mul | BinaryOp::Div => Precedence::Product,
        // pow() lowers to a call.
        BinaryOp::Pow => Precedence::Postfix,
    }
}

fn format_f64_literal(value: f64) -> String {
    let mut out = format!("{value}");
    if !out.contains('.') && !out.contains('e') && !out.contains('E') {
        out.push_str(".0");
    }
    out
}

fn render_expr(expr: Expr, f: &mut fmt::Formatter<'_>, parent_prec: Precedence) -> fmt::Result {
    match expr.node() {
        ExprNode::Number(value) => {
            let needs_paren = value < 0.0 && Precedence::Prefix < parent_prec;
            if needs_paren {
                write!(f, "(")?;
            }
            write!(f, "{}", format_f64_literal(value))?;
            if needs_paren {
                write!(f, ")")?;
            }
            Ok(())
        }
        ExprNode::Pi => write!(f, "M_PI"),
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
            render_expr(arg, f, prec)?;
            if needs_paren {
                write!(f, ")")?;
            }
            Ok(())
        }
        ExprNode::Func { func, arg } => {
            write!(f, "{}(", func_name(func))?;
            render_expr(arg, f, Precedence::Lowest)?;
            write!(f, ")")
        }
        ExprNode::Binary {
            left,
            op: BinaryOp::Pow,
            right,
        } => {
            write!(f, "pow(")?;
            render_expr(left, f, Precedence::Lowest)?;
            write!(f, ", ")?;
            render_expr(right, f, Precedence::Lowest)?;
            write!(f, ")")
        }
        ExprNode::Binary { left, op, right } => {
            let prec = binary_precedence(op);
            let needs_paren = prec < parent_prec;
            if needs_paren {
                write!(f, "(")?;
            }
            render_expr(left, f, prec)?;
            write!(f, "{}", binary_symbol(op))?;
            // Subtraction and division are not associative; preserve RHS grouping.
            let right_prec = match op {
                BinaryOp::Sub | BinaryOp::Div => next_precedence(prec),
                _ => prec,
            };
            render_expr(right, f, right_prec)?;
            if needs_paren {
                write!(f, ")")?;
            }
            Ok(())
        }
    }
}

fn func_name(func: Func) -> &'static str {
    // The symbolic names happen to match libm's; keep the mapping explicit
    // so a renamed Func variant cannot silently change the emitted call.
    match func {
        Func::Exp => "exp",
        Func::Ln => "log",
        Func::Sin => "sin",
        Func::Cos => "cos",
    }
}

fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => " + ",
        BinaryOp::Sub => " - ",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Pow => unreachable!("pow renders as a call"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_always_carry_a_decimal_point() {
        assert_eq!(expr_to_c(Expr::number(100.0)), "100.0");
        assert_eq!(expr_to_c(Expr::number(0.5)), "0.5");
        // Rust's shortest round-trip formatting never uses exponent notation.
        assert_eq!(
            expr_to_c(Expr::number(2.6967687e-8)),
            "0.000000026967687"
        );
    }

    #[test]
    fn power_lowers_to_a_pow_call() {
        let x = Expr::symbol("x");
        assert_eq!(expr_to_c(x.pow(2.0)), "pow(x, 2.0)");
        assert_eq!(
            expr_to_c((x + Expr::number(1.0)).pow(-1.0)),
            "pow(x + 1.0, -1.0)"
        );
    }

    #[test]
    fn pi_lowers_to_m_pi() {
        let x = Expr::symbol("x");
        let expr = (Expr::number(4.0) * Expr::pi() * x).sin();
        assert_eq!(expr_to_c(expr), "sin(4.0*M_PI*x)");
    }

    #[test]
    fn parentheses_follow_c_precedence() {
        let a = Expr::symbol("a");
        let b = Expr::symbol("b");
        let c = Expr::symbol("c");
        assert_eq!(expr_to_c(a * (b + c)), "a*(b + c)");
        assert_eq!(expr_to_c(a - (b - c)), "a - (b - c)");
        assert_eq!(expr_to_c(a / (b * c)), "a/(b*c)");
        assert_eq!(expr_to_c((a * b) + c), "a*b + c");
    }

    #[test]
    fn negative_literals_stay_valid_after_operators() {
        let x = Expr::symbol("x");
        let expr = x - Expr::symbol("y") * Expr::number(-1.5);
        // Unary minus binds tighter than `*` and `-`, so this parses as
        // x - (y * -1.5) without extra parentheses.
        assert_eq!(expr_to_c(expr), "x - y*-1.5");
    }

    #[test]
    fn scalar_function_sorts_parameters() {
        let body = Expr::symbol("y") * Expr::symbol("tau") + Expr::symbol("P_a");
        let function = CFunction::scalar("f", body);
        assert_eq!(function.params(), ["P_a", "tau", "y"]);
    }

    #[test]
    fn function_renders_in_result_variable_shape() {
        let x = Expr::symbol("x");
        let function = CFunction::scalar("f", x.pow(2.0));
        assert_eq!(
            function.to_c(),
            "double f(double x) {\n   double f_result;\n   f_result = pow(x, 2.0);\n   return f_result;\n}\n"
        );
    }

    #[test]
    fn with_params_rejects_undeclared_symbols() {
        let body = Expr::symbol("x") * Expr::symbol("tau");
        let err = CFunction::with_params("f", vec!["x".to_string()], body).unwrap_err();
        assert_eq!(
            err,
            CodegenError::UndeclaredSymbol {
                function: "f".to_string(),
                symbol: "tau".to_string(),
            }
        );
        assert!(err.to_string().contains("tau"));
    }

    #[test]
    fn with_params_allows_extra_declared_parameters() {
        let body = Expr::symbol("x");
        let function =
            CFunction::with_params("f", vec!["tau".to_string(), "x".to_string()], body).unwrap();
        assert!(function.to_c().starts_with("double f(double tau, double x)"));
    }

    #[test]
    fn source_prefixes_math_header() {
        let mut source = CSource::new();
        source.push(CFunction::scalar("f", Expr::symbol("x")));
        let text = source.to_c();
        assert!(text.starts_with("#include <math.h>\n"));
        assert!(text.contains("double f(double x)"));
    }

    #[test]
    fn emission_is_deterministic() {
        let build = || {
            let x = Expr::symbol("x");
            let body = (Expr::number(4.0) * Expr::pi() * x).sin().pow(2.0);
            CFunction::scalar("f", body).to_c()
        };
        assert_eq!(build(), build());
    }
}
