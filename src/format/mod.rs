//! Output formatting for `issue_board`.
//!
//! Human-readable text lives in [`text`]. JSON output is the serde form of
//! the model types, written by the commands themselves.

mod text;

pub use text::{
    TextFormatOptions, format_issue_details, format_issue_line, format_issue_line_with,
    format_priority_label, format_similar_warning, format_status_icon, format_status_label,
    terminal_width, truncate_title,
};
