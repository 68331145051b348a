//! Layered configuration loading with inheritance and provenance.
//!
//! A document may inherit from other documents through an `@extends`
//! directive, delete inherited keys through `@unset`, and declare
//! substitution variables through `%NAME%` keys. The loader resolves the
//! whole chain depth-first, deep-merges the trees (later imports override
//! earlier ones, the importing document overrides all of them), and can
//! retain enough provenance to reconstruct *why* any merged value has the
//! value it has.
//!
//! The format parser is a capability supplied by the caller: anything
//! implementing [`ParseSource`] works as a backend, so the core stays
//! format-agnostic.
//!
//! # Example
//!
//! ```rust,ignore
//! let loader = Loader::new(YamlParser)
//!     .with_replacements(vec![("CONFIG_DIR", "/etc/app")])
//!     .with_debug(true);
//!
//! let config = loader.load("/etc/app/development.yml")?;
//! if let Some(trace) = explain("database::host", &config) {
//!     println!("{}", trace);
//! }
//! ```

mod error;
mod explain;
mod loader;
mod merge;
mod replace;
mod value;

pub use error::{LoadError, Result, SourceError};

pub use explain::{explain, Explanation, Resolution};

pub use loader::{
    LoadedConfig,
    Loader,
    ParseSource,
    Provenance,
    EXTENDS_KEY,
    UNSET_KEY,
};

pub use merge::{deep_merge, merge_mappings};

pub use replace::{substitute, ReplacementMap, VAR_MARKER};

pub use value::{Scalar, Value};
