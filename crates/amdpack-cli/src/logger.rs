//! Logging setup for the amdpack CLI.
//!
//! - `--verbose`: debug level for the amdpack crates
//! - `--quiet`: errors only
//! - otherwise `RUST_LOG`, falling back to info
//!
//! # Example
//!
//! ```rust,no_run
//! use amdpack_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("Starting build");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "amdpack=debug,amdpack_bundler=debug,amdpack_cli=debug";
const QUIET_FILTER: &str = "amdpack=error,amdpack_bundler=error,amdpack_cli=error";
const DEFAULT_FILTER: &str = "amdpack=info,amdpack_bundler=info,amdpack_cli=info";

/// Pick the filter for the given verbosity flags.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the global tracing subscriber. Call once, early in `main`.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}
