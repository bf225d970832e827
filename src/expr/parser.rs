//! Expression parser implementation using pest

use pest::Parser;
use pest_derive::Parser;

use super::ast::{Expr, Op};
use crate::{EvalError, Result};

#[derive(Parser)]
#[grammar = "expr.pest"]
pub struct ExpressionParser;

/// Parse a group expression such as `role1 - role2 + role3`.
///
/// Both operators share the same precedence and associate to the left,
/// so `a - b + c` parses as `(a - b) + c`. Parsing is pure and
/// deterministic; equal inputs yield structurally equal trees.
pub fn parse_expression(source: &str) -> Result<Expr> {
    let mut pairs = ExpressionParser::parse(Rule::expression, source)
        .map_err(|e| EvalError::Parse(e.to_string()))?;

    let expression = pairs
        .next()
        .ok_or_else(|| EvalError::Parse("empty expression".to_string()))?;

    let mut inner = expression.into_inner();

    let first = inner
        .next()
        .ok_or_else(|| EvalError::Parse("expected a term".to_string()))?;
    let mut expr = Expr::Ident(first.as_str().to_string());

    while let Some(op_pair) = inner.next() {
        if op_pair.as_rule() == Rule::EOI {
            break;
        }

        let op = match op_pair.as_str() {
            "+" => Op::Union,
            "-" => Op::Subtract,
            other => return Err(EvalError::Parse(format!("unknown operator: {other}"))),
        };

        let term = inner
            .next()
            .ok_or_else(|| EvalError::Parse("expected a term after operator".to_string()))?;

        expr = Expr::binary(op, expr, Expr::Ident(term.as_str().to_string()));
    }

    Ok(expr)
}
