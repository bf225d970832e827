//! Action path normalization
//!
//! Rule paths and action paths accept a single colon-delimited string, a
//! sequence of fragments, or arbitrarily nested mixes of both. Every form
//! flattens to one ordered sequence of trimmed tokens.

use crate::{EvalError, Result};

/// Flexible path input for rules and actions.
///
/// `"admin:posts:new"`, `("admin", "posts:new")` and
/// `["admin", "posts", "new"]` all normalize to the same token sequence.
pub trait IntoActionPath {
    /// Append this path's tokens, split on `:` and trimmed, onto `out`
    fn collect_into(&self, out: &mut Vec<String>);

    /// Normalize to one flat ordered token sequence
    fn tokens(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }
}

impl IntoActionPath for str {
    fn collect_into(&self, out: &mut Vec<String>) {
        out.extend(
            self.split(':')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string),
        );
    }
}

impl IntoActionPath for String {
    fn collect_into(&self, out: &mut Vec<String>) {
        self.as_str().collect_into(out);
    }
}

impl<T: IntoActionPath + ?Sized> IntoActionPath for &T {
    fn collect_into(&self, out: &mut Vec<String>) {
        (**self).collect_into(out);
    }
}

impl<T: IntoActionPath> IntoActionPath for [T] {
    fn collect_into(&self, out: &mut Vec<String>) {
        for part in self {
            part.collect_into(out);
        }
    }
}

impl<T: IntoActionPath> IntoActionPath for Vec<T> {
    fn collect_into(&self, out: &mut Vec<String>) {
        self.as_slice().collect_into(out);
    }
}

impl<T: IntoActionPath, const N: usize> IntoActionPath for [T; N] {
    fn collect_into(&self, out: &mut Vec<String>) {
        self.as_slice().collect_into(out);
    }
}

macro_rules! impl_tuple_path {
    ($($part:ident),+) => {
        impl<$($part: IntoActionPath),+> IntoActionPath for ($($part,)+) {
            fn collect_into(&self, out: &mut Vec<String>) {
                #[allow(non_snake_case)]
                let ($($part,)+) = self;
                $($part.collect_into(out);)+
            }
        }
    };
}

impl_tuple_path!(A);
impl_tuple_path!(A, B);
impl_tuple_path!(A, B, C);
impl_tuple_path!(A, B, C, D);

/// Normalize an action path for matching, rejecting wildcard tokens.
pub(crate) fn action_tokens(action: &impl IntoActionPath) -> Result<Vec<String>> {
    let tokens = action.tokens();
    if let Some(bad) = tokens.iter().find(|token| token.contains('*')) {
        return Err(EvalError::InvalidAction(bad.clone()));
    }
    Ok(tokens)
}
