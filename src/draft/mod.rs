//! Create-issue form with a debounced duplicate check.
//!
//! Every title or description edit schedules a similarity check through a
//! [`Debouncer`]. Only the most recent edit's result is published; results
//! of superseded checks are dropped.

mod debounce;

pub use debounce::Debouncer;

use crate::error::{IssueBoardError, Result};
use crate::model::{Issue, NewIssue, Priority, Status};
use crate::session::CurrentUser;
use crate::similarity::{check_store, should_check};
use crate::storage::IssueStore;
use crate::validation::NewIssueValidator;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info};

/// Result of the latest similarity check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimilarityReport {
    /// Edit generation the matches belong to.
    pub generation: u64,
    pub matches: Vec<Issue>,
}

impl SimilarityReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// The form being drafted plus its pending duplicate check.
pub struct DraftSession<S> {
    form: NewIssue,
    blank: NewIssue,
    store: Arc<Mutex<S>>,
    debouncer: Debouncer,
    generation: Arc<AtomicU64>,
    report: watch::Sender<SimilarityReport>,
}

impl<S> DraftSession<S>
where
    S: IssueStore + Send + 'static,
{
    #[must_use]
    pub fn new(store: Arc<Mutex<S>>, delay: Duration) -> Self {
        let (report, _) = watch::channel(SimilarityReport::default());
        Self {
            form: NewIssue::default(),
            blank: NewIssue::default(),
            store,
            debouncer: Debouncer::new(delay),
            generation: Arc::new(AtomicU64::new(0)),
            report,
        }
    }

    /// Use `priority` for fresh forms, including after each submit.
    #[must_use]
    pub fn with_default_priority(mut self, priority: Priority) -> Self {
        self.blank.priority = priority;
        self.form.priority = priority;
        self
    }

    #[must_use]
    pub const fn form(&self) -> &NewIssue {
        &self.form
    }

    /// Snapshot of the latest published report.
    #[must_use]
    pub fn report(&self) -> SimilarityReport {
        self.report.borrow().clone()
    }

    /// Receiver notified whenever a new report is published.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SimilarityReport> {
        self.report.subscribe()
    }

    #[must_use]
    pub fn is_checking(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.form.title = title.into();
        self.schedule_check();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.form.description = description.into();
        self.schedule_check();
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.form.priority = priority;
    }

    pub fn set_status(&mut self, status: Status) {
        self.form.status = status;
    }

    pub fn set_assignee(&mut self, assignee: impl Into<String>) {
        self.form.assigned_to = assignee.into();
    }

    /// Create the issue as `user`.
    ///
    /// On success the form is reset and the report cleared. On failure the
    /// form is kept as is.
    ///
    /// # Errors
    ///
    /// Returns `NotLoggedIn` without a user, a validation error for an
    /// incomplete form, or the store's error.
    pub async fn submit(&mut self, user: Option<&CurrentUser>) -> Result<String> {
        let user = user.ok_or_else(|| IssueBoardError::not_logged_in("create an issue"))?;
        NewIssueValidator::check(&self.form)?;

        self.debouncer.cancel();
        let generation = self.next_generation();

        let id = {
            let mut store = self.store.lock().await;
            store.create(&self.form, &user.email)?
        };
        info!(id = %id, created_by = %user.email, "issue created");

        self.form = self.blank.clone();
        publish(&self.report, &self.generation, generation, Vec::new());
        Ok(id)
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn schedule_check(&mut self) {
        let generation = self.next_generation();

        if !should_check(&self.form.title, &self.form.description) {
            self.debouncer.cancel();
            publish(&self.report, &self.generation, generation, Vec::new());
            return;
        }

        let store = Arc::clone(&self.store);
        let latest = Arc::clone(&self.generation);
        let report = self.report.clone();
        let title = self.form.title.clone();
        let description = self.form.description.clone();

        self.debouncer.schedule(async move {
            let matches = {
                let store = store.lock().await;
                check_store(&*store, &title, &description)
            };
            debug!(generation, matches = matches.len(), "draft check finished");
            publish(&report, &latest, generation, matches);
        });
    }
}

/// Publish `matches` unless a newer edit has happened since `generation`.
fn publish(
    report: &watch::Sender<SimilarityReport>,
    latest: &AtomicU64,
    generation: u64,
    matches: Vec<Issue>,
) {
    report.send_if_modified(|current| {
        if latest.load(Ordering::SeqCst) != generation || current.generation > generation {
            return false;
        }
        *current = SimilarityReport {
            generation,
            matches,
        };
        true
    });
}
