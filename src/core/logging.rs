//! Tracing subscriber setup

use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

/// Default filter when RUST_LOG is unset
pub fn default_filter(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "huntr_notion=debug,warn"
    } else if quiet {
        "error"
    } else {
        "warn"
    }
}

/// Install the global fmt subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn init(default_filter: &str) -> Result<(), String> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| format!("failed to initialize tracing: {e}"))
}
