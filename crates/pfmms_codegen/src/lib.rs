//! Deterministic lowering of symbolic expressions to C source text.

pub mod c_ast;

pub use c_ast::{expr_to_c, CFunction, CSource, CodegenError};
