//! briefcast CLI — daily briefing generator.
//!
//! Assembles multi-section briefing documents from web search, content
//! extraction, and LLM synthesis, with a persisted configuration store and
//! per-dependency health probing.

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
