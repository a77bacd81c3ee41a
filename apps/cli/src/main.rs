//! TitleScout CLI — property-record enrichment tool.
//!
//! Fills missing county names and recorded title owners in a property CSV
//! by geocoding addresses and scraping county property-record sites.

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
