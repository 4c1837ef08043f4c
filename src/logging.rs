//! Logging setup on top of `tracing-subscriber`.
//!
//! Logs go to stderr so that stdout stays clean for command output and
//! `--json` payloads.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the level comes from the flags:
/// `-q` selects `error`, `-v` selects `debug`, `-vv` and above `trace`,
/// and the default is `warn`. An explicit `filter` overrides both.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool, filter: Option<&str>) -> anyhow::Result<()> {
    let env_filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level_for(verbose, quiet))),
    };

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .without_time()
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))
}

/// Install a test subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call takes effect.
pub fn init_test_logging() {
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

const fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}
