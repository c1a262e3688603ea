// src/error.rs

//! Error types for descriptor compilation
//!
//! Every failure is fatal: generation is a single offline pass, so callers
//! abort on the first error and discard any output.

use thiserror::Error;

/// Errors that can occur while loading a descriptor or emitting a graph
#[derive(Error, Debug)]
pub enum Error {
    /// The descriptor version string does not parse
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Structurally invalid descriptor content
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// An auxiliary data entry does not have the shape a consumer expects
    #[error("Auxiliary data '{key}' must be {expected}, found {found}")]
    AuxType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A `configure` flag is not a string
    #[error("Configure flag #{index} must be a string, found {found}")]
    ConfigureFlag { index: usize, found: String },

    /// Malformed template text
    #[error("Template error on line {line}: {message}")]
    Template { line: usize, message: String },

    /// Template text calls a function that is not registered
    #[error("Unknown template function '{name}' on line {line}")]
    UnknownFunction { name: String, line: usize },

    /// A template function was called with the wrong number of arguments
    #[error("Template function '{name}' expects {expected} argument(s), got {found}")]
    Arity {
        name: &'static str,
        expected: String,
        found: usize,
    },

    /// A metadata field cannot be written as a shell assignment
    #[error("Cannot encode {field} value '{value}' as a shell assignment")]
    UnsafeValue { field: &'static str, value: String },

    /// Source URL with a scheme the fetch graph cannot handle
    #[error("Scheme {0}:// not recognized")]
    UnsupportedScheme(String),

    /// Descriptor, URL or metadata text that fails to parse
    #[error("Parse error: {0}")]
    ParseError(String),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;
