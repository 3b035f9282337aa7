//! `latchkey` - single-door access controller simulator.
//!
//! Boots an [`AccessController`](latchkey_controller::AccessController) over
//! a file-backed EEPROM image and mock peripherals, then drives it from a
//! script file or from stdin. See `latchkey --help`.

mod console;
mod script;
mod sim;

use anyhow::{Context, Result};
use clap::Parser;
use latchkey_controller::ControllerConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::sim::Simulator;

/// Simulate a Latchkey door controller.
#[derive(Parser, Debug)]
#[command(name = "latchkey")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Controller configuration (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// EEPROM image holding the credential store. Created if missing.
    #[arg(long)]
    image: PathBuf,

    /// Run commands from this file on a virtual clock instead of stdin.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Hold the button through boot to erase the credential store.
    #[arg(long)]
    hold_reset: bool,
}

fn load_config(path: Option<&Path>) -> Result<ControllerConfig> {
    let Some(path) = path else {
        return Ok(ControllerConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: ControllerConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // RUST_LOG=latchkey_controller=debug for per-command output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let mut sim = Simulator::boot(config, &cli.image, cli.hold_reset)?;

    match cli.script {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading script {}", path.display()))?;
            sim.run_script(&text)
        }
        None => sim.run_interactive().await,
    }
}
