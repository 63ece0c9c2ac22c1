//! Centralized error types for dispatchmail.
//!
//! Parsing itself never fails with these: a dispatch or status email that
//! cannot be interpreted produces a [`Rejection`](crate::model::work_order::Rejection)
//! instead. `DispatchError` covers the I/O and configuration surface around it.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the dispatchmail library.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Email file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file does not look like an RFC 5322 message.
    #[error("File does not appear to be an email message: {0}")]
    InvalidEmail(PathBuf),

    /// The configuration could not be read or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, DispatchError>`.
pub type Result<T> = std::result::Result<T, DispatchError>;

impl DispatchError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
