//! amdpack CLI - compile TypeScript to a single self-contained AMD bundle.
//!
//! The CLI runs the TypeScript compiler with `--module amd --outFile`,
//! watches the output file and hands every new emit to
//! [`amdpack_bundler::Bundler`], writing the bundle back in place.
//!
//! # Modules
//!
//! - [`cli`] - clap argument definitions
//! - [`commands`] - `build` command
//! - [`compiler`] - compiler invocation and the process/watch driver
//! - [`config`] - `amdpack.config.json`, environment and CLI layering
//! - [`watch`] - debounced output file watcher
//! - [`tsconfig`] - default target and output path for an input
//! - [`error`], [`logger`], [`ui`] - errors, tracing setup, terminal output
//!
//! # Example
//!
//! ```rust,no_run
//! use amdpack_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod compiler;
pub mod config;
pub mod error;
pub mod logger;
pub mod tsconfig;
pub mod ui;
pub mod watch;

pub use error::{CliError, ConfigError, Result, ResultExt};
