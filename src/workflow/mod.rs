//! Status transition guard.
//!
//! Every status change goes through [`update_status`], which consults
//! [`attempt_transition`] before touching the store. The only refused move is
//! `Open -> Done`; an issue has to pass through `In Progress` first.

use crate::error::{IssueBoardError, Result};
use crate::model::Status;
use crate::storage::IssueStore;
use tracing::{debug, info};

pub const OPEN_TO_DONE_REASON: &str = "Cannot move issue directly from Open to Done";

/// Decide whether `current -> requested` is allowed.
///
/// Same-status requests are accepted as no-ops.
///
/// # Errors
///
/// Returns `TransitionRejected` for `Open -> Done`.
pub fn attempt_transition(current: Status, requested: Status) -> Result<()> {
    match (current, requested) {
        (Status::Open, Status::Done) => Err(IssueBoardError::TransitionRejected {
            from: current,
            to: requested,
            reason: OPEN_TO_DONE_REASON.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Guarded status update.
///
/// `current` is the status the caller last observed. The store is only
/// called once the guard accepts, and only `status` is written.
///
/// # Errors
///
/// Returns `TransitionRejected` without calling the store, or whatever the
/// store reports.
pub fn update_status<S: IssueStore + ?Sized>(
    store: &mut S,
    id: &str,
    current: Status,
    requested: Status,
) -> Result<()> {
    if let Err(e) = attempt_transition(current, requested) {
        debug!(id, from = %current, to = %requested, "transition rejected");
        return Err(e);
    }

    store.set_status(id, requested)?;
    info!(id, from = %current, to = %requested, "status updated");
    Ok(())
}
