//! SalesAgent TUI — interactive terminal interface for the support agent.
//!
//! Tabs for catalog chat, lead capture, social caption drafting, and the
//! lead ledger, built with `ratatui` + `crossterm`.

mod app;
mod screens;
mod widgets;

use std::fs::OpenOptions;
use std::sync::Mutex;

use color_eyre::eyre::Result;
use salesagent_shared::{config_dir, load_config};

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;
    let config = load_config()?;
    app::run(config)
}

/// The terminal is owned by the UI, so logs go to `~/.salesagent/tui.log`.
fn init_tracing() -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("tui.log"))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("salesagent_tui=info,salesagent_core=info,salesagent_leads=info,salesagent_storage=info")
    });

    fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
