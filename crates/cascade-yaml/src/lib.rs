//! YAML backend for the cascade-config parser capability.
//!
//! File identifiers are treated as filesystem paths. Each file is read,
//! parsed with `yaml-rust2`, and converted into the engine's [`Value`] tree.
//! Only the first document of a multi-document stream is used.

use cascade_config::{ParseSource, Scalar, SourceError, Value};
use indexmap::IndexMap;
use std::fs;
use thiserror::Error;
use yaml_rust2::{Yaml, YamlLoader};

/// Errors raised by the YAML backend.
#[derive(Debug, Error)]
pub enum YamlError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}")]
    Scan {
        path: String,
        #[source]
        source: yaml_rust2::ScanError,
    },

    #[error("{path} contains no YAML document")]
    Empty { path: String },

    #[error("unsupported YAML in {path}: {reason}")]
    Convert { path: String, reason: String },
}

/// A [`ParseSource`] that reads YAML files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl ParseSource for YamlParser {
    fn parse(&self, file: &str) -> Result<Value, SourceError> {
        Ok(load_file(file)?)
    }
}

/// Read and parse one YAML file into a value tree.
pub fn load_file(path: &str) -> Result<Value, YamlError> {
    let content = fs::read_to_string(path).map_err(|source| YamlError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_str(&content, path)
}

/// Parse YAML text into a value tree. `path` is used for error reporting
/// only.
pub fn parse_str(content: &str, path: &str) -> Result<Value, YamlError> {
    let docs = YamlLoader::load_from_str(content).map_err(|source| YamlError::Scan {
        path: path.to_string(),
        source,
    })?;
    let doc = docs.into_iter().next().ok_or_else(|| YamlError::Empty {
        path: path.to_string(),
    })?;
    convert(doc, path)
}

fn convert(yaml: Yaml, path: &str) -> Result<Value, YamlError> {
    match yaml {
        Yaml::String(s) => Ok(Value::Scalar(Scalar::String(s))),
        Yaml::Integer(i) => Ok(Value::Scalar(Scalar::Integer(i))),
        Yaml::Real(raw) => raw
            .parse::<f64>()
            .map(|x| Value::Scalar(Scalar::Float(x)))
            .map_err(|_| YamlError::Convert {
                path: path.to_string(),
                reason: format!("unparseable float literal '{}'", raw),
            }),
        Yaml::Boolean(b) => Ok(Value::Scalar(Scalar::Bool(b))),
        Yaml::Null => Ok(Value::Scalar(Scalar::Null)),
        Yaml::Array(items) => {
            let mut converted = Vec::with_capacity(items.len());
            for item in items {
                converted.push(convert(item, path)?);
            }
            Ok(Value::Sequence(converted))
        }
        Yaml::Hash(entries) => {
            let mut mapping = IndexMap::with_capacity(entries.len());
            for (key, value) in entries {
                let key = match key {
                    Yaml::String(s) => s,
                    other => {
                        return Err(YamlError::Convert {
                            path: path.to_string(),
                            reason: format!("non-string mapping key {:?}", other),
                        })
                    }
                };
                mapping.insert(key, convert(value, path)?);
            }
            Ok(Value::Mapping(mapping))
        }
        Yaml::Alias(_) => Err(YamlError::Convert {
            path: path.to_string(),
            reason: "YAML aliases are not supported".to_string(),
        }),
        Yaml::BadValue => Err(YamlError::Convert {
            path: path.to_string(),
            reason: "malformed YAML value".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_typing() {
        let tree = parse_str("s: text\ni: 42\nf: 2.5\nb: true\nn: null", "types.yml").unwrap();

        assert_eq!(tree.at_path(&["s"]).unwrap().as_str(), Some("text"));
        assert_eq!(tree.at_path(&["i"]), Some(&Value::Scalar(Scalar::Integer(42))));
        assert_eq!(tree.at_path(&["f"]), Some(&Value::Scalar(Scalar::Float(2.5))));
        assert_eq!(tree.at_path(&["b"]), Some(&Value::Scalar(Scalar::Bool(true))));
        assert_eq!(tree.at_path(&["n"]), Some(&Value::Scalar(Scalar::Null)));
    }

    #[test]
    fn test_nested_structures() {
        let tree = parse_str(
            "database:\n  host: localhost\n  replicas:\n    - r1\n    - r2",
            "nested.yml",
        )
        .unwrap();

        assert_eq!(
            tree.at_path(&["database", "host"]).unwrap().as_str(),
            Some("localhost")
        );
        let replicas = tree
            .at_path(&["database", "replicas"])
            .unwrap()
            .as_sequence()
            .unwrap();
        assert_eq!(replicas.len(), 2);
        assert_eq!(replicas[1].as_str(), Some("r2"));
    }

    #[test]
    fn test_key_order_preserved() {
        let tree = parse_str("z: 1\na: 2\nm: 3", "order.yml").unwrap();
        let keys: Vec<&String> = tree.as_mapping().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_empty_input() {
        let err = parse_str("", "empty.yml").unwrap_err();
        assert!(matches!(err, YamlError::Empty { .. }));
    }

    #[test]
    fn test_invalid_yaml_is_scan_error() {
        let err = parse_str("key: [unclosed", "bad.yml").unwrap_err();
        assert!(matches!(err, YamlError::Scan { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_file("/definitely/not/here.yml").unwrap_err();
        assert!(matches!(err, YamlError::Io { .. }));
    }
}
