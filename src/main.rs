//! jsoncache - store and fetch expiring JSON payloads from the command line

use std::io;
use std::process::ExitCode;

use clap::Parser;

use jsoncache::cli::{self, Cli, Exit};
use jsoncache::logging;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("failed to initialize logging: {}", e);
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();
    let exit = match cli::run(&cli, stdin.lock(), &mut stdout.lock(), &mut stderr.lock()) {
        Ok(exit) => exit,
        Err(e) => {
            eprintln!("jsoncache: {}", e);
            Exit::Failure
        }
    };

    ExitCode::from(exit.code())
}
