//! Group expression parsing: the `+`/`-` mini language

pub mod ast;
pub mod parser;

// Re-export main types
pub use ast::{Expr, Op};
pub use parser::parse_expression;
