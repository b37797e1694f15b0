mod cli;
mod config;
mod db;
mod errors;
mod ledger;
mod letters;
mod listings;
mod models;
mod pipeline;
mod resume;
mod review;
mod state;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    cli::run(cli, || {
        let config = Config::from_env()?;

        // Initialize structured logging
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
            }))
            .with(tracing_subscriber::fmt::layer())
            .init();

        info!("Starting hunter v{}", env!("CARGO_PKG_VERSION"));
        Ok(config)
    })
    .await
}
