//! Recursive evaluation of action paths against the rule tree

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::expr::{parse_expression, Expr, Op};
use crate::path::{action_tokens, IntoActionPath};
use crate::rules::{RuleNode, Rules, WILDCARD};
use crate::trace::{Trace, TraceElement};
use crate::{EvalError, Result};

/// Group substitutions allowed on one evaluation path before the depth cap
/// trips. The resolving stack catches true cycles first; the cap backs it.
const MAX_DEPTH: usize = 100;

impl Rules {
    /// Evaluate an action path against the tree, producing the full trace
    /// of every rule and sub-group consulted on the way to the verdict.
    #[instrument(skip_all)]
    pub fn evaluate(&self, action: impl IntoActionPath) -> Result<Trace> {
        let tokens = action_tokens(&action)?;
        debug!(action = %tokens.join(":"), "evaluating action path");

        if tokens.is_empty() {
            return Ok(Trace::mismatched());
        }

        let mut evaluation = Evaluation::new(self);
        let trace = evaluation.mapping(self.roots(), &tokens)?;
        debug!(matched = trace.is_match(), trace = %trace, "evaluation complete");
        Ok(trace)
    }

    /// Whether the action path is permitted
    pub fn matches(&self, action: impl IntoActionPath) -> Result<bool> {
        Ok(self.evaluate(action)?.is_match())
    }
}

/// State for one evaluation pass: the tree under scrutiny and the stack of
/// group names currently being substituted, for cycle detection.
struct Evaluation<'a> {
    rules: &'a Rules,
    resolving: Vec<String>,
}

impl<'a> Evaluation<'a> {
    fn new(rules: &'a Rules) -> Self {
        Self {
            rules,
            resolving: Vec::new(),
        }
    }

    /// Evaluate a node against the remaining action tokens.
    fn node(&mut self, node: Option<&'a RuleNode>, tokens: &[String]) -> Result<Trace> {
        match node {
            // nothing matches an absent node, whatever remains
            None => Ok(Trace::mismatched()),
            // exhausted tokens on a present node is a match
            Some(_) if tokens.is_empty() => Ok(Trace::matched()),
            Some(RuleNode::Group(groups)) => self.mapping(groups, tokens),
            Some(RuleNode::Alternatives(alternatives)) => {
                self.alternatives(alternatives, tokens)
            }
            Some(RuleNode::Value(raw)) => self.value(raw, tokens),
        }
    }

    /// Descend one level of sub-groups by the next action token.
    fn mapping(
        &mut self,
        groups: &'a HashMap<String, RuleNode>,
        tokens: &[String],
    ) -> Result<Trace> {
        let Some((head, rest)) = tokens.split_first() else {
            return Ok(Trace::matched());
        };
        // a missing key mismatches without inspecting the remaining tokens
        Ok(Trace::token(head.clone()).concat(self.node(groups.get(head), rest)?))
    }

    /// First alternative whose own evaluation matches wins; on a clean miss
    /// the whole list is recorded, not the individual failed attempts.
    fn alternatives(&mut self, alternatives: &'a [String], tokens: &[String]) -> Result<Trace> {
        for alternative in alternatives {
            let trace = self.value(alternative, tokens)?;
            if trace.is_match() {
                return Ok(trace);
            }
        }

        let mut trace = Trace::new();
        trace.push(TraceElement::Alternatives(alternatives.to_vec()));
        Ok(trace.concat(Trace::mismatched()))
    }

    /// A string value: record the raw text, lazily parse it as a group
    /// expression and evaluate the result. A lone identifier that names no
    /// root group degenerates to a literal leaf token.
    fn value(&mut self, raw: &str, tokens: &[String]) -> Result<Trace> {
        let expr = parse_expression(raw)?;
        Ok(Trace::token(raw).concat(self.expr(&expr, tokens)?))
    }

    fn expr(&mut self, expr: &Expr, tokens: &[String]) -> Result<Trace> {
        match expr {
            Expr::Ident(name) => {
                if name != WILDCARD && self.rules.has_group(name) {
                    self.group_ref(name, tokens)
                } else {
                    Ok(Trace::verdict(leaf_match(name, tokens)))
                }
            }
            Expr::Binary { op, left, right } => {
                self.validate(expr)?;
                match op {
                    Op::Union => self.union(left, right, tokens),
                    Op::Subtract => self.subtract(left, right, tokens),
                }
            }
        }
    }

    /// Substitute a root group's sub-tree for an identifier, prefixed in the
    /// trace by the group's name.
    fn group_ref(&mut self, name: &str, tokens: &[String]) -> Result<Trace> {
        if self.resolving.iter().any(|group| group == name) || self.resolving.len() >= MAX_DEPTH {
            return Err(EvalError::CyclicReference(name.to_string()));
        }

        let rules = self.rules;
        self.resolving.push(name.to_string());
        let result = self.node(rules.root(name), tokens);
        self.resolving.pop();

        Ok(Trace::token(name).concat(result?))
    }

    /// Union keeps the left operand's trace as the visible explanation even
    /// when the right operand is the one that matched; only when both sides
    /// miss are both traces kept.
    fn union(&mut self, left: &Expr, right: &Expr, tokens: &[String]) -> Result<Trace> {
        let left_trace = self.expr(left, tokens)?;
        if left_trace.is_match() {
            return Ok(Trace::nested(left_trace).concat(Trace::matched()));
        }

        let right_trace = self.expr(right, tokens)?;
        if right_trace.is_match() {
            Ok(Trace::nested(left_trace).concat(Trace::matched()))
        } else {
            Ok(Trace::nested(left_trace)
                .concat(Trace::nested(right_trace))
                .concat(Trace::mismatched()))
        }
    }

    /// Subtraction succeeds by showing why the exclusion did not apply: the
    /// right side's failed trace is kept and the left's is dropped. A failed
    /// subtraction keeps both sides for diagnosis.
    fn subtract(&mut self, left: &Expr, right: &Expr, tokens: &[String]) -> Result<Trace> {
        let left_trace = self.expr(left, tokens)?;
        if left_trace.is_mismatch() {
            return Ok(Trace::nested(left_trace).concat(Trace::mismatched()));
        }

        let right_trace = self.expr(right, tokens)?;
        if right_trace.is_mismatch() {
            Ok(Trace::nested(right_trace).concat(Trace::matched()))
        } else {
            Ok(Trace::nested(left_trace)
                .concat(Trace::nested(right_trace))
                .concat(Trace::mismatched()))
        }
    }

    /// Every identifier reachable in the expression must be the wildcard or
    /// a current root group. Re-checked on every evaluation; group names may
    /// change between calls.
    fn validate(&self, expr: &Expr) -> Result<()> {
        for name in expr.idents() {
            if name != WILDCARD && !self.rules.has_group(name) {
                return Err(EvalError::UnknownGroup {
                    name: name.to_string(),
                    known: self
                        .rules
                        .group_names()
                        .iter()
                        .map(|known| known.to_string())
                        .collect(),
                });
            }
        }
        Ok(())
    }
}

/// Literal leaf semantics: the wildcard absorbs any number of remaining
/// tokens; any other leaf matches exactly one remaining, equal token.
fn leaf_match(leaf: &str, tokens: &[String]) -> bool {
    match tokens {
        [] => true,
        [only] => leaf == WILDCARD || leaf == only,
        _ => leaf == WILDCARD,
    }
}
