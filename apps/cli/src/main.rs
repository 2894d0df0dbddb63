//! SalesAgent CLI — sales & marketing support agent.
//!
//! Indexes a product/FAQ catalog, answers questions over it, captures and
//! scores leads, and drafts social media captions.

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
