use std::io::{self, IsTerminal};

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging to stderr so program output on stdout stays clean.
///
/// Use the `RUST_LOG` environment variable to override the default filter,
/// e.g. `RUST_LOG=tape_bf=trace` to see every jump.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (tests, embedding) is harmless.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .try_init();
}
