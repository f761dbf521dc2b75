use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    cli.run()
}
