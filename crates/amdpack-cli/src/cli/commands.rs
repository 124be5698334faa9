use std::path::PathBuf;

use amdpack_bundler::{EsTarget, ImportAs};
use clap::{Args, Subcommand};

use crate::cli::validation::{
    parse_export_as, parse_import_as, parse_import_as_default, parse_target,
};

/// Available amdpack subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile and bundle a TypeScript script or project
    ///
    /// Runs the compiler with --module amd --outFile, then rewrites the
    /// emitted file into a self-contained bundle.
    Build(BuildArgs),
}

/// Arguments for the build command
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// TypeScript script (.ts, .tsx) or tsconfig.json to compile
    ///
    /// Examples:
    ///   amdpack build src/index.ts
    ///   amdpack build tsconfig.json --export-as App
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Bundle output path (default: derived from the input)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub out_file: Option<PathBuf>,

    /// ES target for the compiler and the loader runtime
    ///
    /// One of es3, es5, es6, es2015, es2016, es2017, es2018, esnext.
    #[arg(short, long, value_parser = parse_target, value_name = "TARGET")]
    pub target: Option<EsTarget>,

    /// Assign the entry module's exports to a global, or to module.exports with 'commonjs'
    #[arg(long, value_parser = parse_export_as, value_name = "NAME")]
    pub export_as: Option<String>,

    /// Expose a host global as a module namespace (e.g. jQuery=jquery)
    #[arg(long, value_parser = parse_import_as, value_name = "GLOBAL=MODULE")]
    pub import_as: Vec<ImportAs>,

    /// Expose a host global as a module's default export (e.g. React=react)
    #[arg(long, value_parser = parse_import_as_default, value_name = "GLOBAL=MODULE")]
    pub import_as_default: Vec<ImportAs>,

    /// Module resolved by the loader instead of the last one defined
    #[arg(long, value_name = "MODULE")]
    pub entry_point: Option<String>,

    /// Keep the compiler running and rebundle on every emit
    #[arg(short, long)]
    pub watch: bool,

    /// Directory resource paths are resolved against (default: the input's directory)
    #[arg(long, value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// Path to a config file (default: ./amdpack.config.json if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Compiler program to run (default: tsc)
    #[arg(long, value_name = "PROGRAM")]
    pub compiler: Option<String>,
}
