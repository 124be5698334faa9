//! amdpack CLI entry point: argument parsing, logging setup and dispatch.

use clap::Parser;
use amdpack_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args).await,
    };

    if let Err(err) = result {
        // A failed compiler run exits with the compiler's own code.
        let code = err.exit_code();
        eprintln!("{:?}", error::cli_error_to_miette(err));
        std::process::exit(code);
    }
}
