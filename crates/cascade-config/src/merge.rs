//! Deep structural merge and post-merge key deletion.
//!
//! The merge rule, applied recursively:
//!
//! - mapping over mapping: key-wise recursion, keys only present in the base
//!   are retained
//! - sequence over sequence: positional, element *i* of the override is
//!   merged over element *i* of the base, extra elements from either side
//!   are kept (this is not concatenation)
//! - everything else: the override wins outright

use crate::value::Value;
use indexmap::IndexMap;

/// Merge `over` on top of `base`.
pub fn deep_merge(base: Value, over: Value) -> Value {
    match (base, over) {
        (Value::Mapping(base), Value::Mapping(over)) => {
            Value::Mapping(merge_mappings(base, over))
        }
        (Value::Sequence(mut base), Value::Sequence(over)) => {
            for (i, item) in over.into_iter().enumerate() {
                if i < base.len() {
                    let existing = std::mem::replace(&mut base[i], Value::null());
                    base[i] = deep_merge(existing, item);
                } else {
                    base.push(item);
                }
            }
            Value::Sequence(base)
        }
        (_, over) => over,
    }
}

/// Key-wise merge of two mappings. Base key order is preserved; keys new in
/// the override are appended in their own order.
pub fn merge_mappings(
    mut base: IndexMap<String, Value>,
    over: IndexMap<String, Value>,
) -> IndexMap<String, Value> {
    for (key, over_value) in over {
        match base.get_mut(&key) {
            Some(slot) => {
                let base_value = std::mem::replace(slot, Value::null());
                *slot = deep_merge(base_value, over_value);
            }
            None => {
                base.insert(key, over_value);
            }
        }
    }
    base
}

/// Delete the leaf addressed by a `::`-delimited path from a mapping.
///
/// Returns `true` if a value was removed. A path through a missing key or a
/// non-mapping intermediate removes nothing and returns `false`; the caller
/// decides whether that is an error.
pub fn delete_path(root: &mut IndexMap<String, Value>, path: &str) -> bool {
    let mut keys: Vec<&str> = path.split("::").collect();
    let last = match keys.pop() {
        Some(last) => last,
        None => return false,
    };

    let mut current = root;
    for key in keys {
        match current.get_mut(key) {
            Some(Value::Mapping(inner)) => current = inner,
            _ => return false,
        }
    }

    current.shift_remove(last).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Scalar;

    fn map(entries: Vec<(&str, Value)>) -> Value {
        Value::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    fn seq(items: Vec<Value>) -> Value {
        Value::Sequence(items)
    }

    #[test]
    fn test_mapping_recursion() {
        let base = map(vec![(
            "db",
            map(vec![("host", Value::string("h1")), ("port", Value::from(1))]),
        )]);
        let over = map(vec![("db", map(vec![("port", Value::from(2))]))]);

        let merged = deep_merge(base, over);
        assert_eq!(merged.at_path(&["db", "host"]).unwrap().as_str(), Some("h1"));
        assert_eq!(
            merged.at_path(&["db", "port"]),
            Some(&Value::Scalar(Scalar::Integer(2)))
        );
    }

    #[test]
    fn test_base_only_keys_retained() {
        let base = map(vec![("a", Value::from(1)), ("b", Value::from(2))]);
        let over = map(vec![("b", Value::from(3))]);

        let merged = deep_merge(base, over);
        let entries = merged.as_mapping().unwrap();
        assert_eq!(entries.get("a"), Some(&Value::from(1)));
        assert_eq!(entries.get("b"), Some(&Value::from(3)));
    }

    #[test]
    fn test_sequence_merge_is_positional() {
        let base = seq(vec!["a".into(), "b".into(), "c".into()]);
        let over = seq(vec!["x".into(), "y".into()]);

        let merged = deep_merge(base, over);
        assert_eq!(merged, seq(vec!["x".into(), "y".into(), "c".into()]));
    }

    #[test]
    fn test_sequence_of_mappings_merges_elements() {
        let base = seq(vec![map(vec![("host", Value::string("h1")), ("port", Value::from(1))])]);
        let over = seq(vec![map(vec![("port", Value::from(2))])]);

        let merged = deep_merge(base, over);
        let first = &merged.as_sequence().unwrap()[0];
        assert_eq!(first.at_path(&["host"]).unwrap().as_str(), Some("h1"));
        assert_eq!(first.at_path(&["port"]), Some(&Value::from(2)));
    }

    #[test]
    fn test_type_mismatch_override_wins() {
        let base = map(vec![("k", map(vec![("nested", Value::from(1))]))]);
        let over = map(vec![("k", Value::string("flat"))]);

        let merged = deep_merge(base, over);
        assert_eq!(merged.at_path(&["k"]).unwrap().as_str(), Some("flat"));
    }

    #[test]
    fn test_delete_path_leaf_only() {
        let tree = map(vec![(
            "database",
            map(vec![("dbname", Value::string("app")), ("cache", Value::from(true))]),
        )]);
        let mut root = match tree {
            Value::Mapping(entries) => entries,
            _ => unreachable!(),
        };

        assert!(delete_path(&mut root, "database::cache"));
        let database = root.get("database").unwrap().as_mapping().unwrap();
        assert!(database.contains_key("dbname"));
        assert!(!database.contains_key("cache"));
    }

    #[test]
    fn test_delete_path_missing_is_noop() {
        let mut root = IndexMap::new();
        root.insert("a".to_string(), Value::from(1));

        assert!(!delete_path(&mut root, "b::c"));
        assert!(!delete_path(&mut root, "a::b"));
        assert_eq!(root.get("a"), Some(&Value::from(1)));
    }
}
