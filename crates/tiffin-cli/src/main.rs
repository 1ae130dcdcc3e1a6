//! Tiffin command-line entry point.

#![forbid(unsafe_code)]

use clap::Parser;

use tiffin_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tiffin_cli::run(Cli::parse()).await
}
