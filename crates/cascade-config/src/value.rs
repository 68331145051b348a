//! Core value tree for configuration documents.

use indexmap::IndexMap;
use std::fmt;

/// An atomic configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Scalar {
    /// Render the scalar as a string, the way a variable declaration coerces
    /// its value before substitution.
    pub fn coerce_string(&self) -> String {
        match self {
            Scalar::String(s) => s.clone(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(x) => x.to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Null => String::new(),
        }
    }
}

/// A configuration value: a scalar, an ordered sequence, or a mapping.
///
/// Mappings preserve insertion order for deterministic output; the order has
/// no effect on merge semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

impl Value {
    /// Shorthand for a string scalar.
    pub fn string(s: impl Into<String>) -> Self {
        Value::Scalar(Scalar::String(s.into()))
    }

    /// Shorthand for a null scalar.
    pub fn null() -> Self {
        Value::Scalar(Scalar::Null)
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Walk a chain of mapping keys, returning the value at the end of the
    /// path. Any step through a non-mapping or a missing key yields `None`.
    pub fn at_path(&self, keys: &[&str]) -> Option<&Value> {
        let mut current = self;
        for key in keys {
            match current {
                Value::Mapping(entries) => current = entries.get(*key)?,
                _ => return None,
            }
        }
        Some(current)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Scalar(Scalar::Integer(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Scalar(Scalar::Float(x))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Null => f.write_str("null"),
        }
    }
}

/// Compact single-line rendering, used by explanation traces.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(scalar) => write!(f, "{}", scalar),
            Value::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Mapping(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: Vec<(&str, Value)>) -> Value {
        Value::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    #[test]
    fn test_at_path_nested() {
        let tree = map(vec![(
            "database",
            map(vec![("host", Value::string("localhost")), ("port", Value::from(5432))]),
        )]);

        let host = tree.at_path(&["database", "host"]).unwrap();
        assert_eq!(host.as_str(), Some("localhost"));

        assert!(tree.at_path(&["database", "missing"]).is_none());
        assert!(tree.at_path(&["database", "host", "deeper"]).is_none());
    }

    #[test]
    fn test_at_path_empty_is_identity() {
        let tree = map(vec![("a", Value::from(1))]);
        assert_eq!(tree.at_path(&[]), Some(&tree));
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(Scalar::String("x".into()).coerce_string(), "x");
        assert_eq!(Scalar::Integer(42).coerce_string(), "42");
        assert_eq!(Scalar::Bool(true).coerce_string(), "true");
        assert_eq!(Scalar::Null.coerce_string(), "");
    }

    #[test]
    fn test_display_compact() {
        let tree = map(vec![
            ("host", Value::string("h3")),
            ("ports", Value::Sequence(vec![Value::from(1), Value::from(2)])),
        ]);
        assert_eq!(tree.to_string(), "{host: h3, ports: [1, 2]}");
    }
}
