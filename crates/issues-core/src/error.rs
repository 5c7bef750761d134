//! Error types for `issues-core`.
//!
//! Contract errors carry the exact message strings callers see in the
//! `error` field of a response. Storage errors are everything else.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for issue operations.
#[derive(Error, Debug)]
pub enum IssueError {
    // === Validation Errors ===
    /// Create was called without one of the required fields.
    #[error("required field(s) missing")]
    RequiredFieldsMissing { missing: Vec<&'static str> },

    /// Update or delete was called without an `_id`.
    #[error("missing _id")]
    MissingId,

    /// Update carried an `_id` but nothing to change.
    #[error("no update field(s) sent")]
    NoUpdateFields { id: String },

    // === Not Found Errors ===
    /// Update target does not exist in the project (or the id is malformed).
    #[error("could not update")]
    CouldNotUpdate { id: String },

    /// Delete target does not exist in the project (or the id is malformed).
    #[error("could not delete")]
    CouldNotDelete { id: String },

    /// Lookup target does not exist in the project.
    #[error("could not find")]
    CouldNotFind { id: String },

    // === Storage Errors ===
    /// Generic storage error raised by a store backend.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Failed to parse a line in the JSONL file.
    #[error("JSONL parse error at line {line}: {reason}")]
    JsonlParse { line: usize, reason: String },

    /// File not found at the specified path.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of an [`IssueError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or incomplete caller input, detected before touching the store.
    Validation,
    /// Well-formed input referencing a record that does not exist.
    NotFound,
    /// Backend failure; not part of the caller-facing contract.
    Storage,
}

impl IssueError {
    #[must_use]
    pub fn storage(reason: impl std::fmt::Display) -> Self {
        Self::Storage(reason.to_string())
    }

    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RequiredFieldsMissing { .. } | Self::MissingId | Self::NoUpdateFields { .. } => {
                ErrorKind::Validation
            }
            Self::CouldNotUpdate { .. } | Self::CouldNotDelete { .. } | Self::CouldNotFind { .. } => {
                ErrorKind::NotFound
            }
            Self::Storage(_)
            | Self::JsonlParse { .. }
            | Self::FileNotFound(_)
            | Self::Io(_)
            | Self::Json(_) => ErrorKind::Storage,
        }
    }

    /// True for errors that belong in a response body rather than
    /// propagating as a failure.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Storage)
    }
}

/// Result type using `IssueError`.
pub type Result<T> = std::result::Result<T, IssueError>;
