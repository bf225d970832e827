//! The rule tree: named permission groups and their mutation

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::path::IntoActionPath;

/// The universal wildcard marker, legal in rule definitions only
pub const WILDCARD: &str = "*";

/// One node of the rule tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleNode {
    /// Nested sub-groups
    Group(HashMap<String, RuleNode>),

    /// Ordered alternative leaf tokens; `*` is a legal alternative
    Alternatives(Vec<String>),

    /// A single leaf token or a group expression, parsed lazily at
    /// evaluation time
    Value(String),
}

/// The mutable store of named permission groups.
///
/// Built by insertions, read arbitrarily often through
/// [`Rules::evaluate`](crate::rules::Rules::evaluate) and
/// [`Rules::matches`](crate::rules::Rules::matches). Single writer, no
/// internal locking; callers must not mutate concurrently with reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    groups: HashMap<String, RuleNode>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree directly from root groups
    pub fn from_groups<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = (String, RuleNode)>,
    {
        Self {
            groups: groups.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Sorted root group names, used in diagnostics
    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn roots(&self) -> &HashMap<String, RuleNode> {
        &self.groups
    }

    pub(crate) fn root(&self, name: &str) -> Option<&RuleNode> {
        self.groups.get(name)
    }

    pub(crate) fn has_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Insert alternative leaf tokens under a group path.
    ///
    /// Every path token is an intermediate group name, materialized as an
    /// empty sub-group when absent. The value is dequoted (one layer of
    /// matching `'…'`, `"…"` or `[…]`), split on commas and trimmed, and
    /// stored as the ordered alternative list at the final token.
    pub fn insert(&mut self, path: impl IntoActionPath, value: &str) {
        let tokens = path.tokens();
        let Some((last, intermediate)) = tokens.split_last() else {
            return;
        };

        let mut current = &mut self.groups;
        for token in intermediate {
            let entry = current
                .entry(token.clone())
                .or_insert_with(|| RuleNode::Group(HashMap::new()));
            if !matches!(entry, RuleNode::Group(_)) {
                // a leaf in the middle of the path gives way to sub-groups
                *entry = RuleNode::Group(HashMap::new());
            }
            match entry {
                RuleNode::Group(next) => current = next,
                _ => unreachable!("intermediate node was just normalized to a group"),
            }
        }

        current.insert(
            last.clone(),
            RuleNode::Alternatives(split_alternatives(value)),
        );
    }

    /// Append a rule whose final path segment is the value:
    /// `add("admin:posts:new,create,destroy")` is
    /// `insert(["admin", "posts"], "new,create,destroy")`.
    pub fn add(&mut self, rule: impl IntoActionPath) {
        let mut tokens = rule.tokens();
        if let Some(value) = tokens.pop() {
            self.insert(tokens, &value);
        }
    }

    /// Remove the leaf named by the path's final token from its parent
    /// alternative list, pruning any group the removal empties, up to but
    /// never removing the root. Silent no-op when any segment is missing.
    pub fn delete(&mut self, path: impl IntoActionPath) {
        let tokens = path.tokens();
        if !tokens.is_empty() {
            prune(&mut self.groups, &tokens);
        }
    }
}

fn prune(groups: &mut HashMap<String, RuleNode>, tokens: &[String]) {
    let Some((head, rest)) = tokens.split_first() else {
        return;
    };

    let emptied = match groups.get_mut(head) {
        Some(RuleNode::Group(sub)) if !rest.is_empty() => {
            prune(sub, rest);
            sub.is_empty()
        }
        Some(RuleNode::Alternatives(alternatives)) if rest.len() == 1 => {
            alternatives.retain(|alternative| alternative != &rest[0]);
            alternatives.is_empty()
        }
        Some(RuleNode::Value(value)) if rest.len() == 1 && value == &rest[0] => true,
        _ => false,
    };

    if emptied {
        groups.remove(head);
    }
}

fn split_alternatives(value: &str) -> Vec<String> {
    dequote(value.trim())
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strip one layer of matching quote or bracket characters:
/// `'*'`, `"*"`, `[new,destroy]`.
fn dequote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let matching = matches!(
            (bytes[0], bytes[bytes.len() - 1]),
            (b'\'', b'\'') | (b'"', b'"') | (b'[', b']')
        );
        if matching {
            return &value[1..value.len() - 1];
        }
    }
    value
}
