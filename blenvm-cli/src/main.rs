//! BLE NVM image tool - Main Entry Point

use anyhow::Result;
use clap::Parser;

mod cli;
mod image;
mod record_spec;

fn main() -> Result<()> {
    env_logger::init();
    let cli = cli::Cli::parse();
    cli::run(cli)
}
