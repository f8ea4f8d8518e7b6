//! Tracing subscriber setup for the binary

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Pick the log filter: `--verbose` wins, then `RUST_LOG`, then warnings only
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else if quiet {
        EnvFilter::new(Level::ERROR.to_string())
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(Level::WARN.to_string())
    }
}

/// Install the global subscriber, writing to stderr
///
/// Calling this twice is harmless; the second install is ignored.
pub fn init_logging(verbose: bool, quiet: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbose, quiet))
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time()
        .try_init();
}
