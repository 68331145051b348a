//! The loader: recursive import resolution, substitution, merge, and unset.
//!
//! A document may carry three reserved top-level keys:
//!
//! - `@extends`: ordered sequence of files to inherit from, resolved left to
//!   right, later entries overriding earlier ones, the document itself
//!   overriding all of them
//! - `@unset`: ordered sequence of `::`-delimited key paths deleted from the
//!   merged result
//! - `%NAME%`-style keys: document-local replacement variables, stripped
//!   before merge
//!
//! Substitution runs before import resolution, so `@extends` entries may use
//! replacement tokens. Each `load()` call is independent; the only state
//! threaded through the recursion is the per-call ancestor set.

use crate::error::{LoadError, Result, SourceError};
use crate::merge::{delete_path, merge_mappings};
use crate::replace::{substitute, ReplacementMap, VAR_MARKER};
use crate::value::{Scalar, Value};
use indexmap::IndexMap;
use tracing::debug;

/// Reserved key naming the import list.
pub const EXTENDS_KEY: &str = "@extends";

/// Reserved key naming the post-merge deletions.
pub const UNSET_KEY: &str = "@unset";

/// A format parser supplied by the caller.
///
/// The loader is format-agnostic: anything that turns a file identifier into
/// a value tree works as a backend. The returned tree must be a mapping; the
/// loader treats anything else as a contract violation.
pub trait ParseSource {
    fn parse(&self, file: &str) -> std::result::Result<Value, SourceError>;
}

impl<F> ParseSource for F
where
    F: Fn(&str) -> std::result::Result<Value, SourceError>,
{
    fn parse(&self, file: &str) -> std::result::Result<Value, SourceError> {
        self(file)
    }
}

/// Out-of-band derivation metadata for one loaded document.
///
/// Carried alongside the mapping, never inside it, so debug mode cannot
/// collide with real configuration keys or change merge results.
#[derive(Debug, Clone)]
pub struct Provenance {
    /// Originating file identifier.
    pub file: String,
    /// Post-substitution, pre-import snapshot of the document's own content,
    /// reserved keys stripped.
    pub raw: Value,
    /// The document's merged subtree (imports applied, unsets applied).
    pub merged: Value,
    /// The document's retained `@unset` paths.
    pub unsets: Vec<String>,
    /// Provenance of each direct import, in `@extends` order.
    pub imports: Vec<Provenance>,
}

/// The result of a `load()` call: the merged mapping, plus provenance when
/// the loader was built in debug mode.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub value: Value,
    pub provenance: Option<Provenance>,
}

/// The files open along the current import descent. Copied on descend, so
/// two independent branches may import the same file without tripping the
/// cycle check.
#[derive(Debug, Clone, Default)]
struct AncestorSet {
    chain: Vec<String>,
}

impl AncestorSet {
    fn contains(&self, file: &str) -> bool {
        self.chain.iter().any(|entry| entry == file)
    }

    fn descend(&self, file: &str) -> AncestorSet {
        let mut chain = self.chain.clone();
        chain.push(file.to_string());
        AncestorSet { chain }
    }

    fn chain_through(&self, file: &str) -> Vec<String> {
        let mut chain = self.chain.clone();
        chain.push(file.to_string());
        chain
    }
}

/// Loads a configuration document and resolves its inheritance chain.
pub struct Loader<P> {
    parser: P,
    globals: ReplacementMap,
    debug: bool,
    strict_unset: bool,
}

impl<P: ParseSource> Loader<P> {
    pub fn new(parser: P) -> Self {
        Loader {
            parser,
            globals: ReplacementMap::new(),
            debug: false,
            strict_unset: false,
        }
    }

    /// Supply global replacement variables by bare name; the loader wraps
    /// them in the marker character.
    pub fn with_replacements<I, K, V>(mut self, globals: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.globals = ReplacementMap::from_globals(globals);
        self
    }

    /// Retain provenance metadata on the loaded tree, for the explainer.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Fail instead of silently ignoring an `@unset` path that addresses
    /// nothing.
    pub fn with_strict_unset(mut self, strict: bool) -> Self {
        self.strict_unset = strict;
        self
    }

    /// Load `root` and resolve its full inheritance chain. Fails with a
    /// `LoadError` rather than returning a partial tree.
    pub fn load(&self, root: &str) -> Result<LoadedConfig> {
        let (mapping, provenance) = self.resolve(root, &AncestorSet::default())?;
        Ok(LoadedConfig {
            value: Value::Mapping(mapping),
            provenance,
        })
    }

    fn resolve(
        &self,
        file: &str,
        ancestors: &AncestorSet,
    ) -> Result<(IndexMap<String, Value>, Option<Provenance>)> {
        if ancestors.contains(file) {
            return Err(LoadError::Cycle {
                chain: ancestors.chain_through(file),
            });
        }
        let ancestors = ancestors.descend(file);
        debug!(file, depth = ancestors.chain.len(), "resolving document");

        let parsed = self.parser.parse(file).map_err(|source| LoadError::Source {
            file: file.to_string(),
            source,
        })?;
        let mut mapping = match parsed {
            Value::Mapping(entries) => entries,
            _ => {
                return Err(LoadError::ParserContract {
                    file: file.to_string(),
                })
            }
        };

        // Locals are layered over the globals, so a document-local
        // declaration wins over a caller-supplied variable of the same name.
        let mut replacements = self.globals.clone();
        let local_keys: Vec<String> = mapping
            .keys()
            .filter(|key| key.starts_with(VAR_MARKER))
            .cloned()
            .collect();
        for key in local_keys {
            if let Some(value) = mapping.shift_remove(&key) {
                replacements.set(key, coerce_declaration(value));
            }
        }

        for value in mapping.values_mut() {
            substitute(value, &replacements);
        }

        let imports = take_string_list(&mut mapping, EXTENDS_KEY, file)?;
        let unsets = take_string_list(&mut mapping, UNSET_KEY, file)?.unwrap_or_default();

        let raw = self.debug.then(|| Value::Mapping(mapping.clone()));

        let imports = match imports {
            Some(imports) => imports,
            None => {
                // Nothing inherited, so the document's own content is final.
                let provenance = raw.map(|raw| Provenance {
                    file: file.to_string(),
                    merged: raw.clone(),
                    raw,
                    unsets,
                    imports: Vec::new(),
                });
                return Ok((mapping, provenance));
            }
        };

        let mut import_config: IndexMap<String, Value> = IndexMap::new();
        let mut import_provenance = Vec::new();
        for import in &imports {
            let (imported, provenance) = self.resolve(import, &ancestors)?;
            import_config = merge_mappings(import_config, imported);
            if let Some(provenance) = provenance {
                import_provenance.push(provenance);
            }
        }

        let mut merged = merge_mappings(import_config, mapping);

        for path in &unsets {
            let removed = delete_path(&mut merged, path);
            if !removed && self.strict_unset {
                return Err(LoadError::UnsetMissing {
                    file: file.to_string(),
                    path: path.clone(),
                });
            }
        }

        let provenance = raw.map(|raw| Provenance {
            file: file.to_string(),
            raw,
            merged: Value::Mapping(merged.clone()),
            unsets,
            imports: import_provenance,
        });

        Ok((merged, provenance))
    }
}

/// String-coerce a variable declaration's value.
fn coerce_declaration(value: Value) -> String {
    match value {
        Value::Scalar(scalar) => scalar.coerce_string(),
        other => other.to_string(),
    }
}

/// Remove a reserved directive key and require it to be a sequence of
/// strings.
fn take_string_list(
    mapping: &mut IndexMap<String, Value>,
    key: &'static str,
    file: &str,
) -> Result<Option<Vec<String>>> {
    let value = match mapping.shift_remove(key) {
        Some(value) => value,
        None => return Ok(None),
    };

    let items = match value {
        Value::Sequence(items) => items,
        other => {
            return Err(LoadError::Directive {
                file: file.to_string(),
                key,
                reason: format!("expected a sequence, found {}", kind_name(&other)),
            })
        }
    };

    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Scalar(Scalar::String(s)) => entries.push(s),
            other => {
                return Err(LoadError::Directive {
                    file: file.to_string(),
                    key,
                    reason: format!("expected string entries, found {}", kind_name(&other)),
                })
            }
        }
    }
    Ok(Some(entries))
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Scalar(_) => "a scalar",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
    }
}
