//! Validation helpers for `issue_board`.
//!
//! These routines check form data before anything reaches the store and
//! return structured validation errors without side effects.

use crate::error::IssueBoardError;
use crate::model::NewIssue;
use std::fmt;

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 500;

/// Maximum description size in bytes.
pub const MAX_DESCRIPTION_BYTES: usize = 102_400;

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl From<ValidationError> for IssueBoardError {
    fn from(err: ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            reason: err.message,
        }
    }
}

/// Validates the create-issue form.
pub struct NewIssueValidator;

impl NewIssueValidator {
    /// Validate a form and return all validation errors found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(form: &NewIssue) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        // Title: required, max 500 chars.
        if form.title.trim().is_empty() {
            errors.push(ValidationError::new("title", "cannot be empty"));
        }
        if form.title.chars().count() > MAX_TITLE_CHARS {
            errors.push(ValidationError::new("title", "exceeds 500 characters"));
        }

        // Description: required, max 100KB.
        if form.description.trim().is_empty() {
            errors.push(ValidationError::new("description", "cannot be empty"));
        }
        if form.description.len() > MAX_DESCRIPTION_BYTES {
            errors.push(ValidationError::new("description", "exceeds 100KB"));
        }

        if form.assigned_to.chars().any(char::is_control) {
            errors.push(ValidationError::new(
                "assigned_to",
                "cannot contain control characters",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and surface the first failure as an `IssueBoardError`.
    ///
    /// # Errors
    ///
    /// Returns `IssueBoardError::Validation` for the first failed rule.
    pub fn check(form: &NewIssue) -> Result<(), IssueBoardError> {
        Self::validate(form).map_err(|errors| {
            errors
                .into_iter()
                .next()
                .map_or_else(|| IssueBoardError::validation("form", "invalid"), Into::into)
        })
    }
}

/// Validate a login identifier: non-empty, no whitespace.
///
/// # Errors
///
/// Returns `ValidationError` when the identifier is empty or contains whitespace.
pub fn validate_login(identifier: &str) -> Result<(), ValidationError> {
    if identifier.is_empty() {
        return Err(ValidationError::new("email", "cannot be empty"));
    }
    if identifier.chars().any(char::is_whitespace) {
        return Err(ValidationError::new("email", "cannot contain whitespace"));
    }
    Ok(())
}
