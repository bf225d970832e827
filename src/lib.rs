//! # Gatehouse Rules — action-path authorization with evaluation traces
//!
//! Declarative permission groups evaluated against colon-delimited action
//! paths such as `admin:posts:destroy`. Groups nest into sub-groups, end in
//! alternative leaf tokens or wildcards, and compose through a small
//! expression language (`role1 + role2`, `* - banned`). Every evaluation
//! produces a [`Trace`] recording each rule and sub-group consulted on the
//! way to the verdict, so a decision can always be explained.
//!
//! ```
//! use gatehouse_rules::Rules;
//!
//! let mut rules = Rules::new();
//! rules.add("editor:posts:new,create,destroy");
//! rules.add("auditor:posts:destroy");
//! rules.add("admin: editor - auditor");
//!
//! assert!(rules.matches("editor:posts:new").unwrap());
//! assert!(rules.matches("admin:posts:create").unwrap());
//! assert!(!rules.matches("admin:posts:destroy").unwrap());
//!
//! let trace = rules.evaluate("admin:posts:destroy").unwrap();
//! assert!(trace.is_mismatch());
//! println!("{trace}"); // every group consulted, ending in `mismatch`
//! ```

use thiserror::Error;

mod evaluator;
pub mod expr;
pub mod loader;
pub mod path;
pub mod rules;
pub mod trace;

pub use expr::{parse_expression, Expr, Op};
pub use loader::load;
pub use path::IntoActionPath;
pub use rules::{RuleNode, Rules, WILDCARD};
pub use trace::{Trace, TraceElement};

#[derive(Debug, Error)]
pub enum EvalError {
    /// Action paths being matched may not contain the wildcard marker
    #[error("action must not contain '*': {0}")]
    InvalidAction(String),

    /// Malformed group-expression text, surfaced during lazy parsing
    #[error("parse error: {0}")]
    Parse(String),

    /// An expression referenced an identifier that is neither `*` nor a
    /// current root group
    #[error("unknown rule group '{name}', known groups: {known:?}")]
    UnknownGroup { name: String, known: Vec<String> },

    /// A group expression resolved back into a group already being resolved
    #[error("cyclic group reference involving '{0}'")]
    CyclicReference(String),

    /// A loaded document contained a shape outside the rule-node model
    #[error("invalid rule structure: {0}")]
    InvalidRule(String),
}

pub type Result<T> = std::result::Result<T, EvalError>;
