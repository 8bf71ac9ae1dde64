//! Tessera Back-office CLI

use std::{io, process::ExitCode};

use crate::cli::Cli;

mod cli;

#[tokio::main]
pub async fn main() -> ExitCode {
    let cli = match Cli::load() {
        Ok(cli) => cli,
        Err(error) => error.exit(),
    };

    if let Err(error) = cli.run(&mut io::stdout()).await {
        #[expect(
            clippy::print_stderr,
            reason = "errors are reported to the operator after logging may have failed"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
