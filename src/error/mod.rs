//! Error types and handling for `issue_board`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration via the `Other` variant
//! - Provides recovery hints for user-facing errors
//! - Provides structured JSON output for scripted callers

mod structured;

pub use structured::{ErrorCode, StructuredError};

use crate::model::Status;
use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `issue_board` operations.
#[derive(Error, Debug)]
pub enum IssueBoardError {
    // === Storage Errors ===
    /// Database file not found at the specified path.
    #[error("Database not found at '{path}'")]
    DatabaseNotFound { path: PathBuf },

    /// `SQLite` database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // === Issue Errors ===
    /// Issue with the specified ID was not found.
    #[error("Issue not found: {id}")]
    IssueNotFound { id: String },

    /// Partial ID matches multiple issues.
    #[error("Ambiguous ID '{partial}': matches {matches:?}")]
    AmbiguousId {
        partial: String,
        matches: Vec<String>,
    },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Invalid status value.
    #[error("Invalid status: {status}")]
    InvalidStatus { status: String },

    /// Invalid priority value.
    #[error("Invalid priority: {priority}")]
    InvalidPriority { priority: String },

    /// The workflow guard refused a status change.
    #[error("{reason}")]
    TransitionRejected {
        from: Status,
        to: Status,
        reason: String,
    },

    // === Session Errors ===
    /// An operation needed a logged-in user.
    #[error("You must be logged in to {action}")]
    NotLoggedIn { action: String },

    // === Configuration Errors ===
    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Workspace not initialized.
    #[error("Issue board not initialized: run 'ib init' first")]
    NotInitialized,

    /// Already initialized.
    #[error("Already initialized at '{path}'")]
    AlreadyInitialized { path: PathBuf },

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IssueBoardError {
    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run: ib init"),
            Self::DatabaseNotFound { .. } => Some("Check path or run: ib init"),
            Self::NotLoggedIn { .. } => Some("Run: ib login <email>"),
            Self::AmbiguousId { .. } => Some("Provide more characters of the ID"),
            Self::AlreadyInitialized { .. } => Some("Use --force to reinitialize"),
            Self::TransitionRejected { .. } => {
                Some("Move the issue to In Progress before marking it Done")
            }
            Self::InvalidPriority { .. } => Some("Valid priorities: Low, Medium, High"),
            Self::InvalidStatus { .. } => Some("Valid statuses: Open, In Progress, Done"),
            _ => None,
        }
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a not-logged-in error for the named action.
    #[must_use]
    pub fn not_logged_in(action: impl Into<String>) -> Self {
        Self::NotLoggedIn {
            action: action.into(),
        }
    }
}

/// Result type using `IssueBoardError`.
pub type Result<T> = std::result::Result<T, IssueBoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IssueBoardError::IssueNotFound {
            id: "ib-abc123".to_string(),
        };
        assert_eq!(err.to_string(), "Issue not found: ib-abc123");
    }

    #[test]
    fn test_validation_error() {
        let err = IssueBoardError::validation("title", "cannot be empty");
        assert_eq!(err.to_string(), "Validation failed: title: cannot be empty");
    }

    #[test]
    fn test_not_logged_in_message() {
        let err = IssueBoardError::not_logged_in("create an issue");
        assert_eq!(
            err.to_string(),
            "You must be logged in to create an issue"
        );
        assert_eq!(err.suggestion(), Some("Run: ib login <email>"));
    }
}
