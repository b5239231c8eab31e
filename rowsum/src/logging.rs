//! Tracing subscriber setup for the command-line front end

use tracing_subscriber::{fmt, EnvFilter};

/// Install a stderr subscriber; stdout stays reserved for the report
///
/// With no `-v` flags `RUST_LOG` is honoured, falling back to `warn`.
pub fn init(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init();
}
