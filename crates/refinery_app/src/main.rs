use std::process::ExitCode;

use clap::Parser;

mod cli;
mod platform;

fn main() -> anyhow::Result<ExitCode> {
    let args = cli::Args::parse();
    platform::run_app(args)
}
