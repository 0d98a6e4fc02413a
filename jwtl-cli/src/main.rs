//! `jwtl` binary entry point.

use clap::Parser;
use jwtl_cli::{init_tracing, run, Cli, LoggingConfig};
use std::io;
use std::process::ExitCode;
use tracing::debug;

fn main() -> ExitCode {
    // A missing .env file is not an error.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(&LoggingConfig::default().with_json_output(cli.log_json));
    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "loaded environment file");
    }

    let stdout = io::stdout();
    match run(&cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("jwtl: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
