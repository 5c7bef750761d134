//! Error types for `issue_tracker`.
//!
//! Wraps the core [`IssueError`] and adds the workspace, configuration and
//! `SQLite` failures that only the binary side can hit.

use std::path::PathBuf;

use issues_core::IssueError;
use thiserror::Error;

/// Primary error type for the tracker binary and its storage layer.
#[derive(Error, Debug)]
pub enum TrackerError {
    // === Workspace Errors ===
    /// No `.issues` directory was found here or in any parent.
    #[error("Not an issues workspace (or any parent). Run 'issues init' first.")]
    NotInitialized,

    /// `init` found an existing store and `--force` was not given.
    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    // === Configuration Errors ===
    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Input Errors ===
    /// A command-line argument could not be interpreted.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // === Storage Errors ===
    /// Error from the core service or a store.
    #[error(transparent)]
    Issue(#[from] IssueError),

    /// `SQLite` error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrackerError {
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type using `TrackerError`.
pub type Result<T> = std::result::Result<T, TrackerError>;
