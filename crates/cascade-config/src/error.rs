//! Error types for configuration loading.

use thiserror::Error;

/// Boxed error channel for parser capabilities.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for cascade-config operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors that abort a `load()` call. There is no recovery and no partial
/// result.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A file was reached twice along one import descent.
    #[error("import cycle detected: {}", chain.join(" -> "))]
    Cycle {
        /// The files open along the descent, in order, ending with the
        /// repeated file.
        chain: Vec<String>,
    },

    /// The parser capability returned something other than a mapping.
    #[error("the parser for {file} did not return a mapping")]
    ParserContract { file: String },

    /// The parser capability itself failed. The original error is preserved
    /// as the source, never reworded or suppressed.
    #[error("failed to load {file}")]
    Source {
        file: String,
        #[source]
        source: SourceError,
    },

    /// A reserved directive key has the wrong shape.
    #[error("malformed {key} directive in {file}: {reason}")]
    Directive {
        file: String,
        key: &'static str,
        reason: String,
    },

    /// Strict mode only: an `@unset` path addressed nothing.
    #[error("cannot unset {path} in {file}: no such key")]
    UnsetMissing { file: String, path: String },
}
