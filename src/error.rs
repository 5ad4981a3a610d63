//! Domain-specific error types for the certificate placement engine.
//!
//! Internal modules return typed errors (e.g., [`ResolveError`],
//! [`ConfigError`]) while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! SslcertError
//! ├── Resolve(ResolveError)   - contradictory certificate parameters
//! ├── Config(ConfigError)     - TOML parsing, file access, conflicts
//! └── Resource(ResourceError) - source files, target paths
//! ```
use thiserror::Error;

/// Top-level error type for the engine.
#[derive(Error, Debug)]
pub enum SslcertError {
    /// A certificate request could not be resolved.
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// Configuration-related error (parsing, I/O).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Resource operation error (missing source, unusable target).
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
}

/// The resolver's only failure: parameters that contradict each other.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The request for `name` cannot be turned into artifacts.
    #[error("invalid parameters for certificate '{name}': {reason}")]
    InvalidInput {
        /// Certificate title.
        name: String,
        /// Human-readable description of the contradiction.
        reason: String,
    },
}

/// Errors that arise from loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML file contains a syntax or schema error.
    #[error("Invalid TOML in {file}: {message}")]
    InvalidSyntax {
        /// File that failed to parse.
        file: String,
        /// Parser message.
        message: String,
    },

    /// Two certificates claim the same managed file.
    #[error("certificates '{first}' and '{second}' conflict: {detail}")]
    Conflict {
        /// Certificate declared first (in name order).
        first: String,
        /// Certificate that collides with it.
        second: String,
        /// The shared artifact id or target path.
        detail: String,
    },

    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from materializing artifacts.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// A remote source referenced by an artifact does not exist.
    #[error("source file not found: {path}")]
    SourceMissing {
        /// Expected location of the source file.
        path: String,
    },

    /// The target path exists but is not a regular file.
    #[error("target is not a regular file: {path}")]
    NotAFile {
        /// Offending target path.
        path: String,
    },
}
