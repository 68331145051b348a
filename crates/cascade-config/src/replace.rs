//! Replacement variables and token substitution.
//!
//! Tokens are delimiter-wrapped names (`%NAME%`) occurring inside string
//! scalars anywhere in a tree. The replacement map stores tokens with their
//! delimiters included, so lookup is plain prefix matching.

use crate::value::{Scalar, Value};
use indexmap::IndexMap;

/// Marker character wrapping variable names, both in tokens and in
/// document-local declaration keys.
pub const VAR_MARKER: char = '%';

/// Token name → replacement string.
#[derive(Debug, Clone, Default)]
pub struct ReplacementMap {
    entries: IndexMap<String, String>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from bare names, wrapping each in the marker character.
    /// This is how caller-supplied globals enter the loader.
    pub fn from_globals<I, K, V>(globals: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (name, value) in globals {
            map.set(
                format!("{}{}{}", VAR_MARKER, name.as_ref(), VAR_MARKER),
                value.into(),
            );
        }
        map
    }

    /// Insert a token (delimiters included), overwriting any previous value.
    pub fn set(&mut self, token: String, value: String) {
        self.entries.insert(token, value);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every token occurrence in `input`.
    ///
    /// Single left-to-right pass, longest token first at each position, so
    /// substituted text is never re-substituted. Unknown tokens stay
    /// verbatim.
    pub fn apply(&self, input: &str) -> String {
        if self.entries.is_empty() {
            return input.to_string();
        }

        let mut tokens: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(token, value)| (token.as_str(), value.as_str()))
            .collect();
        tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        'scan: while !rest.is_empty() {
            if rest.starts_with(VAR_MARKER) {
                for (token, value) in &tokens {
                    if let Some(tail) = rest.strip_prefix(token) {
                        out.push_str(value);
                        rest = tail;
                        continue 'scan;
                    }
                }
            }
            let mut chars = rest.char_indices();
            chars.next();
            let next = chars.next().map(|(i, _)| i).unwrap_or(rest.len());
            out.push_str(&rest[..next]);
            rest = &rest[next..];
        }
        out
    }
}

/// Substitute tokens in every string scalar of a tree, in place. Non-string
/// scalars are untouched.
pub fn substitute(value: &mut Value, replacements: &ReplacementMap) {
    if replacements.is_empty() {
        return;
    }
    match value {
        Value::Scalar(Scalar::String(s)) => {
            *s = replacements.apply(s);
        }
        Value::Scalar(_) => {}
        Value::Sequence(items) => {
            for item in items {
                substitute(item, replacements);
            }
        }
        Value::Mapping(entries) => {
            for nested in entries.values_mut() {
                substitute(nested, replacements);
            }
        }
    }
}
