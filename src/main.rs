//! Bandcamp CLI - look up bands, albums and tracks from the terminal
//!
//! Prints the result of each lookup as pretty JSON on stdout.

use std::process::ExitCode;

use clap::Parser;

use bandcamp::cli::{execute, Cli, CliError};

fn run(cli: &Cli) -> Result<String, CliError> {
    let client = cli.build_client()?;
    let output = execute(cli, &client)?;
    Ok(serde_json::to_string_pretty(&output)?)
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
