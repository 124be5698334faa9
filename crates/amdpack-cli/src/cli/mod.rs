//! Command-line interface definition for amdpack.
//!
//! - `amdpack build` - compile TypeScript to a single AMD bundle

mod commands;
mod validation;

use clap::Parser;

pub use commands::{BuildArgs, Command};
pub use validation::{parse_export_as, parse_import_as, parse_import_as_default, parse_target};

/// amdpack - bundle TypeScript AMD output into one self-contained script
#[derive(Parser, Debug)]
#[command(
    name = "amdpack",
    version,
    about = "Bundle TypeScript AMD output into one self-contained script",
    long_about = "amdpack runs the TypeScript compiler with --module amd --outFile, inlines\n\
                  resource dependencies (text!, json!, css!, base64!, buffer!, directory!)\n\
                  and wraps the result in a small module loader."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
