//! `issue_board` - a small issue tracker with duplicate warnings.
//!
//! Issues are created, listed, filtered and moved through a guarded
//! `Open -> In Progress -> Done` workflow. While a new issue is drafted, a
//! debounced heuristic warns about likely duplicates already on the board.
//!
//! # Architecture
//!
//! - [`similarity`] - duplicate-detection heuristic
//! - [`workflow`] - status transition guard and guarded update
//! - [`storage`] - the `IssueStore` capability and its `SQLite` implementation
//! - [`draft`] - create-issue form with a debounced similarity check
//! - [`board`] - issue list view model with filters and scoped errors
//! - [`session`] - the current user
//! - [`cli`] - command-line interface

pub mod board;
pub mod cli;
pub mod config;
pub mod draft;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod session;
pub mod similarity;
pub mod storage;
pub mod util;
pub mod validation;
pub mod workflow;

pub use error::{ErrorCode, IssueBoardError, Result, StructuredError};
