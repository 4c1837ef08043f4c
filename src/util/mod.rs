//! Shared utilities for `issue_board`.
//!
//! - ID generation (base36 adaptive) and partial-id resolution
//! - Owner-only file writes for workspace state

pub mod id;

pub use id::{IdConfig, IdGenerator, IdResolver, MatchType, find_matching_ids, normalize_id};

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Write `contents` to `path`, creating it readable by the owner only.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_private_file(path: &Path, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.create(true).write(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()
}
