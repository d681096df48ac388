//! wordroots CLI, the etymology knowledge-base builder.
//!
//! Reads a Wiktionary dump, records where vocabulary words come from, and
//! extends those roots to derived and inflected forms.

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
