//! YAML adapter turning declarative documents into the rule tree
//!
//! The core only requires the nested-mapping/list/string shapes of
//! [`RuleNode`]; this module is the thin deserialization collaborator that
//! produces them from a YAML source, with structural validation of any
//! shape outside the closed node model.

use std::collections::HashMap;

use serde_yaml::Value;

use crate::rules::{RuleNode, Rules};
use crate::{EvalError, Result};

/// Load a YAML document of permission groups.
///
/// ```
/// let rules = gatehouse_rules::load(
///     "admin:\n  posts: [new, create, destroy]\n  users: '*'\n",
/// )
/// .unwrap();
/// assert!(rules.matches("admin:posts:create").unwrap());
/// ```
pub fn load(source: &str) -> Result<Rules> {
    let mut value: Value =
        serde_yaml::from_str(source).map_err(|e| EvalError::InvalidRule(e.to_string()))?;
    value
        .apply_merge()
        .map_err(|e| EvalError::InvalidRule(e.to_string()))?;

    match value {
        Value::Null => Ok(Rules::new()),
        Value::Mapping(mapping) => {
            let mut groups = HashMap::new();
            for (key, entry) in mapping {
                groups.insert(scalar(key)?, node(entry)?);
            }
            Ok(Rules::from_groups(groups))
        }
        other => Err(EvalError::InvalidRule(format!(
            "expected a mapping of groups at the document root, got {}",
            kind(&other)
        ))),
    }
}

fn node(value: Value) -> Result<RuleNode> {
    match value {
        Value::Mapping(mapping) => {
            let mut groups = HashMap::new();
            for (key, entry) in mapping {
                groups.insert(scalar(key)?, node(entry)?);
            }
            Ok(RuleNode::Group(groups))
        }
        Value::Sequence(sequence) => {
            let alternatives = sequence
                .into_iter()
                .map(scalar)
                .collect::<Result<Vec<_>>>()?;
            Ok(RuleNode::Alternatives(alternatives))
        }
        other => Ok(RuleNode::Value(scalar(other)?)),
    }
}

fn scalar(value: Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(EvalError::InvalidRule(format!(
            "expected a scalar, got {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
