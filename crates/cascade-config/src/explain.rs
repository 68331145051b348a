//! Reconstructing why a merged value has the value it has.
//!
//! Works only on trees loaded in debug mode; without provenance the
//! explainer degrades to `None` instead of failing. At each level the trace
//! follows the first contributing import only.

use crate::loader::{LoadedConfig, Provenance};
use crate::value::Value;
use std::fmt;

/// The authoritative value at the root of a trace.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Value(Value),
    Undefined,
}

/// One level of a derivation trace.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// The `::`-delimited key path being explained.
    pub key: String,
    /// Depth in the import chain; the root is level 0.
    pub level: usize,
    /// The file this level describes.
    pub file: String,
    /// The literal value if the file's own raw content defines the path.
    pub defined: Option<Value>,
    /// The value visible at this level through inheritance, when the file
    /// itself does not define the path.
    pub inherited: Option<Value>,
    /// Whether this file explicitly unsets the path.
    pub unset: bool,
    /// Trace of the first import, one level deeper.
    pub import: Option<Box<Explanation>>,
    /// Root level only: the value in the final merged tree.
    pub result: Option<Resolution>,
}

/// Explain how `key_path` ended up with its merged value.
///
/// Returns `None` when the tree carries no provenance (a non-debug load).
pub fn explain(key_path: &str, config: &LoadedConfig) -> Option<Explanation> {
    let provenance = config.provenance.as_ref()?;
    Some(explain_node(key_path, provenance, 0, Some(&config.value)))
}

fn explain_node(
    key_path: &str,
    node: &Provenance,
    level: usize,
    root: Option<&Value>,
) -> Explanation {
    let keys: Vec<&str> = key_path.split("::").collect();

    let defined = node.raw.at_path(&keys).cloned();
    let inherited = match defined {
        Some(_) => None,
        None => node.merged.at_path(&keys).cloned(),
    };
    let unset = node.unsets.iter().any(|path| path == key_path);

    let import = node
        .imports
        .first()
        .map(|parent| Box::new(explain_node(key_path, parent, level + 1, None)));

    let result = root.map(|tree| match tree.at_path(&keys) {
        Some(value) => Resolution::Value(value.clone()),
        None => Resolution::Undefined,
    });

    Explanation {
        key: key_path.to_string(),
        level,
        file: node.file.clone(),
        defined,
        inherited,
        unset,
        import,
        result,
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "  ".repeat(self.level);
        match &self.defined {
            Some(value) => write!(f, "{}{} defined a value: {}", indent, self.file, value)?,
            None => write!(
                f,
                "{}{} did not define a value for {}",
                indent, self.file, self.key
            )?,
        }
        if let Some(value) = &self.inherited {
            write!(f, " but inherited value {}", value)?;
        }
        if self.unset {
            write!(f, " and unset the probably inherited value")?;
        }
        writeln!(f)?;

        if let Some(import) = &self.import {
            write!(f, "{}", import)?;
        }

        match &self.result {
            Some(Resolution::Value(value)) => {
                writeln!(f, "==> The resulting value is {}", value)?;
            }
            Some(Resolution::Undefined) => {
                writeln!(f, "==> The value for {} could not be retrieved.", self.key)?;
            }
            None => {}
        }
        Ok(())
    }
}
