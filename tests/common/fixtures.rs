#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use issue_board::error::{IssueBoardError, Result};
use issue_board::model::{Issue, NewIssue, Priority, Status};
use issue_board::storage::{IssueStore, ListFilters};
use std::cell::Cell;

fn base_time() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_735_689_600, 0).unwrap() // 2025-01-01 00:00:00 UTC
}

/// A stored issue with a fixed creation time. `seq` orders creation.
pub fn issue(seq: i64, title: &str, description: &str) -> Issue {
    Issue {
        id: format!("ib-{seq:03}"),
        title: title.to_string(),
        description: description.to_string(),
        priority: Priority::Medium,
        status: Status::Open,
        assigned_to: String::new(),
        created_by: "alice@example.com".to_string(),
        created_time: base_time() + Duration::seconds(seq),
    }
}

/// Issues in store order (newest first) from `(title, description)` pairs.
pub fn issues_newest_first(pairs: &[(&str, &str)]) -> Vec<Issue> {
    let count = i64::try_from(pairs.len()).unwrap();
    pairs
        .iter()
        .enumerate()
        .map(|(i, (title, description))| {
            issue(count - i64::try_from(i).unwrap(), title, description)
        })
        .collect()
}

pub fn form(title: &str, description: &str) -> NewIssue {
    NewIssue::new(title, description)
}

/// Store whose every call fails, counting how often it was asked.
#[derive(Default)]
pub struct BrokenStore {
    pub calls: Cell<usize>,
}

impl BrokenStore {
    fn fail<T>(&self) -> Result<T> {
        self.calls.set(self.calls.get() + 1);
        Err(IssueBoardError::Other(anyhow::anyhow!("backend unavailable")))
    }
}

impl IssueStore for BrokenStore {
    fn create(&mut self, _issue: &NewIssue, _created_by: &str) -> Result<String> {
        self.fail()
    }

    fn list(&self, _filters: &ListFilters) -> Result<Vec<Issue>> {
        self.fail()
    }

    fn set_status(&mut self, _id: &str, _status: Status) -> Result<()> {
        self.fail()
    }

    fn get(&self, _id: &str) -> Result<Option<Issue>> {
        self.fail()
    }
}
