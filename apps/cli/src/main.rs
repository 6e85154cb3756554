//! recap CLI — monthly personal-activity digest generator.
//!
//! Fetches a handful of personal sources, keeps this month's entries, and
//! prints a newsletter-ready Markdown digest to stdout.

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
