//! Error types for exprsql

use thiserror::Error;

/// Result type alias for exprsql operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Error types for SQL compilation and the execution boundary
#[derive(Debug, Error)]
pub enum SqlError {
    /// An expression node kind appeared in a position the compiler does not handle
    #[error("Unsupported expression: {kind} in {position} position")]
    Unsupported { kind: &'static str, position: &'static str },

    /// Neither side of a comparison resolves to a column reference
    #[error("Malformed comparison: neither side of '{op}' is a column reference")]
    MalformedComparison { op: &'static str },

    /// An IN check against a sequence that is empty at compile time
    #[error("Ambiguous translation on column '{column}': an empty IN list has no valid SQL form")]
    TranslationAmbiguity { column: String },

    /// Table/column metadata could not be resolved
    #[error("Metadata error on '{table}': {message}")]
    Metadata { table: String, message: String },

    /// Invalid caller input (missing argument, zero chunk size, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Statement executor failure, reported by the external collaborator
    #[error("Execute error: {0}")]
    Execute(String),
}

impl SqlError {
    /// Create an unsupported-expression error naming the node kind and its position
    pub fn unsupported(kind: &'static str, position: &'static str) -> Self {
        Self::Unsupported { kind, position }
    }

    /// Create a metadata resolution error for a table
    pub fn metadata(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Metadata {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is an unsupported-expression error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Check if this is a translation-ambiguity error
    pub fn is_ambiguity(&self) -> bool {
        matches!(self, Self::TranslationAmbiguity { .. })
    }

    /// Check if this is a metadata error
    pub fn is_metadata(&self) -> bool {
        matches!(self, Self::Metadata { .. })
    }
}
