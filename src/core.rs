use std::{fmt, io, path::PathBuf, result};

use thiserror::Error;

/// Error types for the reelguard application.
///
/// Covers configuration loading and persisted state handling. Player-level
/// failures never surface here; they are counted and recorded by the registry.
#[derive(Error, Debug)]
pub enum ReelguardError {
    /// Configuration field missing or invalid
    #[error("invalid config field '{field}': {reason}")]
    InvalidConfigField {
        /// The field that is invalid
        field: String,
        /// Reason why the field is invalid
        reason: String,
    },

    /// I/O operation error with path context
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// Standard I/O operation error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParseError {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// Persisted snapshot could not be encoded or decoded
    #[error("invalid persisted state: {0}")]
    Snapshot(String),

    /// Persisted snapshot was written by a newer schema than this build knows
    #[error("unsupported persisted state version {found} (newest known is {supported})")]
    UnsupportedVersion {
        /// Version found in the stored snapshot
        found: u32,
        /// Newest version this build can read
        supported: u32,
    },
}

/// A specialized `Result` type for reelguard operations.
pub type Result<T> = result::Result<T, ReelguardError>;

impl ReelguardError {
    /// Creates a TOML parsing error with optional file path context.
    pub fn toml_parse(error: impl fmt::Display, path: Option<&std::path::Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        ReelguardError::TomlParseError {
            location,
            details: error.to_string(),
        }
    }

    /// Wraps an I/O failure together with the path it happened on.
    pub fn io_at(error: io::Error, path: impl Into<PathBuf>) -> Self {
        ReelguardError::IoError {
            path: path.into(),
            details: error.to_string(),
        }
    }
}
