//! Landbank CLI — Philadelphia Land Bank agenda address pipeline.
//!
//! Scrapes the board meeting page for the latest agenda PDF, extracts
//! the listed property addresses, enriches them against the city's
//! address lookup service, and writes CSV tables.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
