//! docsplit CLI: split a long markdown document into a folder/file archive.
//!
//! Each H1–H3 section becomes a standalone styled document, placed in a
//! folder hierarchy that mirrors the document's outline, all packed into
//! one zip archive.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
