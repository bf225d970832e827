//! Evaluation traces for explainability

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single step recorded during evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceElement {
    /// An action token, group name, or raw expression text that was consulted
    Token(String),

    /// A whole alternative list, recorded when none of its entries matched
    Alternatives(Vec<String>),

    /// An operand's sub-trace, kept as a single element
    Nested(Trace),

    /// Terminal sentinel: the action is permitted
    Matched,

    /// Terminal sentinel: the action is not permitted
    Mismatched,
}

/// Ordered record of every group and token consulted while evaluating an
/// action path, ending in a `Matched` or `Mismatched` sentinel.
///
/// A trace's verdict is decided solely by its last element. Concatenation
/// flattens the element vectors of both sides; sub-traces stay nested
/// because they are single [`TraceElement::Nested`] elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    elements: Vec<TraceElement>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A trace holding only the `Matched` sentinel
    pub fn matched() -> Self {
        Self {
            elements: vec![TraceElement::Matched],
        }
    }

    /// A trace holding only the `Mismatched` sentinel
    pub fn mismatched() -> Self {
        Self {
            elements: vec![TraceElement::Mismatched],
        }
    }

    /// Terminal sentinel chosen from a boolean outcome
    pub fn verdict(matched: bool) -> Self {
        if matched {
            Self::matched()
        } else {
            Self::mismatched()
        }
    }

    /// A trace holding a single token
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            elements: vec![TraceElement::Token(token.into())],
        }
    }

    /// A trace holding `inner` as one nested element
    pub fn nested(inner: Trace) -> Self {
        Self {
            elements: vec![TraceElement::Nested(inner)],
        }
    }

    pub fn push(&mut self, element: TraceElement) {
        self.elements.push(element);
    }

    /// Flattened concatenation of two traces
    #[must_use]
    pub fn concat(mut self, other: Trace) -> Trace {
        self.elements.extend(other.elements);
        self
    }

    /// Whether the trace ends in the `Matched` sentinel
    pub fn is_match(&self) -> bool {
        matches!(self.elements.last(), Some(TraceElement::Matched))
    }

    /// Whether the trace ends in the `Mismatched` sentinel
    pub fn is_mismatch(&self) -> bool {
        matches!(self.elements.last(), Some(TraceElement::Mismatched))
    }

    /// The ordered elements of the trace
    pub fn elements(&self) -> &[TraceElement] {
        &self.elements
    }
}

/// Renders the bracketed audit form, e.g.
/// `[admin, role1 - role2, [role1, users, mismatch], mismatch]`.
impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{element}")?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for TraceElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceElement::Token(token) => f.write_str(token),
            TraceElement::Alternatives(alternatives) => {
                write!(f, "[{}]", alternatives.join(", "))
            }
            TraceElement::Nested(trace) => write!(f, "{trace}"),
            TraceElement::Matched => f.write_str("match"),
            TraceElement::Mismatched => f.write_str("mismatch"),
        }
    }
}
