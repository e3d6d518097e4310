//! Binary crate for the `weather` dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and the interactive dashboard loop
//! - Terminal and JSON presentation of the view model

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod presenter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cmd = cli::Cli::parse();
    cmd.run().await
}

/// Logs go to stderr so stdout carries only the dashboard output.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
