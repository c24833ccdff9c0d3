//! Error types for plantpresets.
//!
//! Library crates use [`PresetsError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all plantpresets operations.
#[derive(Debug, thiserror::Error)]
pub enum PresetsError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A taxon string that does not match the scientific-name grammar.
    #[error("unexpected taxon {input:?}: {reason}")]
    Parse { input: String, reason: String },

    /// A malformed row in an input table.
    #[error("table error in {path:?} at line {line}: {message}")]
    Table {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Preset document serialization error.
    #[error("serialization error: {0}")]
    Serialize(String),

    /// The external archiving step failed.
    #[error("packaging error: {0}")]
    Package(String),

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PresetsError>;

impl PresetsError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error for the offending input.
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a table error pointing at a line of an input file.
    pub fn table(path: impl Into<PathBuf>, line: u64, msg: impl Into<String>) -> Self {
        Self::Table {
            path: path.into(),
            line,
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
