//! Issue list view model.
//!
//! A board belongs to a logged-in viewer. It holds the active filters and a
//! disposable copy of the matching issues. The copy is thrown away and
//! reloaded after every successful mutation.
//! Status-change failures are attached to the issue they concern and expire
//! after [`STATUS_ERROR_TTL_SECS`].

use crate::error::{IssueBoardError, Result};
use crate::model::{Issue, Status};
use crate::session::CurrentUser;
use crate::storage::{IssueStore, ListFilters};
use crate::workflow;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

pub const STATUS_ERROR_TTL_SECS: i64 = 5;

/// A failed status change, scoped to one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    pub issue_id: String,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl StatusError {
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

pub struct Board<S> {
    store: S,
    viewer: CurrentUser,
    filters: ListFilters,
    issues: Vec<Issue>,
    error: Option<String>,
    status_error: Option<StatusError>,
}

impl<S: IssueStore> Board<S> {
    fn empty(store: S, viewer: CurrentUser, filters: ListFilters) -> Self {
        Self {
            store,
            viewer,
            filters,
            issues: Vec::new(),
            error: None,
            status_error: None,
        }
    }

    /// Build a board for `viewer` and load it with `filters`.
    ///
    /// A failed load leaves the board empty with [`Board::error`] set.
    pub fn load(store: S, viewer: CurrentUser, filters: ListFilters) -> Self {
        let mut board = Self::empty(store, viewer, filters);
        if board.reload().is_err() {
            debug!("board starts empty");
        }
        board
    }

    /// Like [`Board::load`] but fails with the store's error.
    ///
    /// # Errors
    ///
    /// Returns the error from listing issues.
    pub fn open(store: S, viewer: CurrentUser, filters: ListFilters) -> Result<Self> {
        let mut board = Self::empty(store, viewer, filters);
        board.reload()?;
        Ok(board)
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    #[must_use]
    pub const fn viewer(&self) -> &CurrentUser {
        &self.viewer
    }

    #[must_use]
    pub const fn filters(&self) -> ListFilters {
        self.filters
    }

    /// Blocking load error, ready for display.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Replace the cached list with a fresh query.
    ///
    /// # Errors
    ///
    /// Returns the store error after recording its display text in
    /// [`Board::error`] and clearing the cached list.
    pub fn reload(&mut self) -> Result<()> {
        match self.store.list(&self.filters) {
            Ok(issues) => {
                debug!(count = issues.len(), viewer = %self.viewer, "board loaded");
                self.issues = issues;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "board load failed");
                self.issues.clear();
                self.error = Some(format!("Failed to load issues: {e}"));
                Err(e)
            }
        }
    }

    /// Replace the filters and reload.
    ///
    /// # Errors
    ///
    /// Returns the store error from the reload.
    pub fn set_filters(&mut self, filters: ListFilters) -> Result<()> {
        self.filters = filters;
        self.reload()
    }

    /// Move issue `id` to `requested`, guarded by the status it currently
    /// shows on the board.
    ///
    /// # Errors
    ///
    /// Returns the rejection or store error after recording it as the
    /// issue's status error.
    pub fn change_status(&mut self, id: &str, requested: Status, now: DateTime<Utc>) -> Result<()> {
        self.status_error = None;

        let result = self
            .issues
            .iter()
            .find(|issue| issue.id == id)
            .map(|issue| issue.status)
            .ok_or_else(|| IssueBoardError::IssueNotFound { id: id.to_string() })
            .and_then(|current| workflow::update_status(&mut self.store, id, current, requested));

        match result {
            Ok(()) => {
                info!(id, status = %requested, actor = %self.viewer, "status changed");
                // The change is stored; a failed refresh shows up in `error()`.
                if self.reload().is_err() {
                    debug!("board refresh after status change failed");
                }
                Ok(())
            }
            Err(e) => {
                let message = match &e {
                    IssueBoardError::TransitionRejected { reason, .. } => reason.clone(),
                    other => format!("Failed to update status: {other}"),
                };
                self.status_error = Some(StatusError {
                    issue_id: id.to_string(),
                    message,
                    expires_at: now + Duration::seconds(STATUS_ERROR_TTL_SECS),
                });
                Err(e)
            }
        }
    }

    /// The status error shown next to `id`, while it has not expired.
    #[must_use]
    pub fn status_error_for(&self, id: &str, now: DateTime<Utc>) -> Option<&str> {
        self.status_error
            .as_ref()
            .filter(|err| err.issue_id == id && err.is_active(now))
            .map(|err| err.message.as_str())
    }
}
