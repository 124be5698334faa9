//! Conversion of CLI errors into miette reports for `main`.

use miette::Report;

use crate::compiler::CompileError;
use crate::error::CliError;

/// Convert a `CliError` into a miette `Report`.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Compile(CompileError::Exit { code }) => miette::miette!(
            help = "Fix the compiler diagnostics above and run the build again",
            "TypeScript compiler exited with code {}",
            code
        ),
        CliError::Compile(CompileError::Spawn(source)) => miette::miette!(
            help = "Install TypeScript (npm install -g typescript) or set 'compiler' in amdpack.config.json",
            "Unable to start the TypeScript compiler: {}",
            source
        ),
        CliError::Bundle(e) => miette::miette!("Bundler error: {}", e),
        _ => miette::miette!("{}", err),
    }
}
