//! Issue persistence.
//!
//! [`IssueStore`] is the narrow capability the rest of the crate depends on:
//! create, list with filters, set status, and fetch one. [`SqliteStorage`]
//! is the shipped implementation.

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStorage;

use crate::error::Result;
use crate::model::{Issue, NewIssue, Priority, Status};

/// Filters for listing issues. Unset fields match everything; set fields
/// combine with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFilters {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
}

impl ListFilters {
    #[must_use]
    pub const fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none()
    }

    /// Whether `issue` passes these filters.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        self.status.is_none_or(|s| issue.status == s)
            && self.priority.is_none_or(|p| issue.priority == p)
    }
}

/// Storage capability used by the workflow, draft and board layers.
pub trait IssueStore {
    /// Persist a new issue. The store assigns the id and creation time.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue cannot be written.
    fn create(&mut self, issue: &NewIssue, created_by: &str) -> Result<String>;

    /// List issues matching `filters`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list(&self, filters: &ListFilters) -> Result<Vec<Issue>>;

    /// Overwrite the status of one issue. No other field changes.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if no issue has this id.
    fn set_status(&mut self, id: &str, status: Status) -> Result<()>;

    /// Fetch one issue by exact id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get(&self, id: &str) -> Result<Option<Issue>>;
}
