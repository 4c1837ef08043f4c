//! Text formatting functions for `issue_board`.
//!
//! - Status icons (○ ◐ ✓)
//! - Priority labels, colored by priority
//! - Issue lines, detail blocks and duplicate warnings

use crate::model::{Issue, Priority, Status};
use crossterm::style::Stylize;
use std::fmt::Write as _;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Status icon characters.
pub mod icons {
    pub const OPEN: &str = "○";
    pub const IN_PROGRESS: &str = "◐";
    pub const DONE: &str = "✓";
}

/// Formatting options for text output.
#[derive(Debug, Clone, Copy)]
pub struct TextFormatOptions {
    pub use_color: bool,
    pub max_width: Option<usize>,
}

impl TextFormatOptions {
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            use_color: false,
            max_width: None,
        }
    }
}

#[must_use]
pub const fn format_status_icon(status: Status) -> &'static str {
    match status {
        Status::Open => icons::OPEN,
        Status::InProgress => icons::IN_PROGRESS,
        Status::Done => icons::DONE,
    }
}

fn paint_status(text: &str, status: Status, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    match status {
        Status::Open => text.green().to_string(),
        Status::InProgress => text.yellow().to_string(),
        Status::Done => text.dark_grey().to_string(),
    }
}

/// Format status label with optional color.
#[must_use]
pub fn format_status_label(status: Status, use_color: bool) -> String {
    paint_status(status.as_str(), status, use_color)
}

/// Format priority label with optional color.
#[must_use]
pub fn format_priority_label(priority: Priority, use_color: bool) -> String {
    let label = priority.as_str();
    if !use_color {
        return label.to_string();
    }

    match priority {
        Priority::High => label.red().bold().to_string(),
        Priority::Medium => label.yellow().to_string(),
        Priority::Low => label.dark_grey().to_string(),
    }
}

/// Determine terminal width from environment (falls back to 80).
#[must_use]
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|columns| columns.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(80)
}

/// Truncate a title to fit within `max_len` visible columns.
///
/// Handles wide characters (emojis, CJK) using `unicode-width`.
#[must_use]
pub fn truncate_title(title: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }

    if UnicodeWidthStr::width(title) <= max_len {
        return title.to_string();
    }

    let (target, ellipsis) = if max_len <= 3 {
        (max_len, "")
    } else {
        (max_len - 3, "...")
    };

    let mut width = 0;
    let mut out = String::new();
    for c in title.chars() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + cw > target {
            break;
        }
        width += cw;
        out.push(c);
    }
    out.push_str(ellipsis);
    out
}

/// Format a single-line issue summary with options.
///
/// Format: `{icon} {id} [{priority}] {title} (@{assignee})`
#[must_use]
pub fn format_issue_line_with(issue: &Issue, options: TextFormatOptions) -> String {
    let icon_plain = format_status_icon(issue.status);
    let assignee_suffix = if issue.is_assigned() {
        format!(" @{}", issue.assigned_to)
    } else {
        String::new()
    };

    let prefix_len = UnicodeWidthStr::width(icon_plain)
        + 1
        + UnicodeWidthStr::width(issue.id.as_str())
        + 1
        + issue.priority.as_str().len()
        + 3
        + UnicodeWidthStr::width(assignee_suffix.as_str());

    let title = options.max_width.map_or_else(
        || issue.title.clone(),
        |width| truncate_title(&issue.title, width.saturating_sub(prefix_len)),
    );

    let icon = paint_status(icon_plain, issue.status, options.use_color);
    let priority = format_priority_label(issue.priority, options.use_color);

    format!("{icon} {} [{priority}] {title}{assignee_suffix}", issue.id)
}

/// Format a single-line issue summary.
#[must_use]
pub fn format_issue_line(issue: &Issue) -> String {
    format_issue_line_with(issue, TextFormatOptions::plain())
}

/// Multi-line detail view used by `ib show`.
#[must_use]
pub fn format_issue_details(issue: &Issue, use_color: bool) -> String {
    let mut out = String::new();
    let title = if use_color {
        issue.title.as_str().bold().to_string()
    } else {
        issue.title.clone()
    };
    let _ = writeln!(out, "{} {title}", issue.id);
    let _ = writeln!(
        out,
        "Status: {}  Priority: {}",
        format_status_label(issue.status, use_color),
        format_priority_label(issue.priority, use_color)
    );
    if issue.is_assigned() {
        let _ = writeln!(out, "Assigned to: {}", issue.assigned_to);
    }
    let _ = writeln!(
        out,
        "Created by {} at {}",
        issue.created_by,
        issue.created_time.format("%Y-%m-%d %H:%M UTC")
    );
    out.push('\n');
    out.push_str(&issue.description);
    out
}

/// Advisory block listing likely duplicates. Empty when there are none.
#[must_use]
pub fn format_similar_warning(matches: &[Issue], options: TextFormatOptions) -> String {
    if matches.is_empty() {
        return String::new();
    }

    let header = "Similar issues already exist:";
    let mut out = if options.use_color {
        header.yellow().bold().to_string()
    } else {
        header.to_string()
    };
    for issue in matches {
        out.push_str("\n  ");
        out.push_str(&format_issue_line_with(issue, options));
    }
    out
}
