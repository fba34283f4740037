//! Logging setup for the bale CLI.
//!
//! The library crates only emit `tracing` events; this installs the
//! subscriber that prints them, on stderr like the rest of the UI.
//!
//! Filter precedence:
//! 1. `--verbose`: debug for every bale crate
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. Default: info for every bale crate

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "bale=debug,bale_bundler=debug,bale_config=debug,bale_cli=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "bale=info,bale_bundler=info,bale_config=info,bale_cli=info";

/// Initialize the global subscriber. Call once, before any logging.
///
/// ```rust,no_run
/// use bale_cli::logger::init_logger;
///
/// init_logger(false, false, false);
/// tracing::info!("Starting build");
/// ```
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter(verbose, quiet))
        .with(fmt_layer)
        .init();
}

fn filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
