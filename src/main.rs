// ABOUTME: Entry point for the stockroom binary.
// ABOUTME: Loads configuration, initializes tracing, opens the store once, and runs one command.

mod cli;
mod commands;
mod config;
mod render;

use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use stockroom_core::Context;
use stockroom_store::open_store;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::{LogLevel, StockroomConfig};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = StockroomConfig::load(&cli.overrides()).context("failed to load configuration")?;
    init_tracing(config.log_level);

    let store = open_store(config.store, &config.db_file)
        .await
        .context("failed to initialize store")?;
    tracing::info!(
        store = %config.store,
        file = %config.db_file.display(),
        "application initialized"
    );

    let ctx = match cli.timeout {
        Some(secs) => Context::with_timeout(Duration::from_secs(secs)),
        None => Context::background(),
    };

    // Ctrl-C cancels; operations already past their context check finish.
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            interrupt.cancel();
        }
    });

    commands::run(cli.command, store.as_ref(), &ctx).await
}

/// Logs go to stderr. RUST_LOG wins over the configured level when set.
fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directives()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
