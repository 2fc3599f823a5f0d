mod cli;
mod commands;
mod config;
mod error;
mod init;
mod input;
mod logging;
mod runner;
mod surface;
mod utils;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    commands::run(cli)
}
