//! Dicebox server binary.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use dicebox::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = cli.into_config();
    info!(
        addr = %config.bind_addr,
        origins = ?config.origins,
        max_board_size = config.registry.max_board_size,
        "starting dicebox server"
    );

    let server = DiceboxServer::builder().config(config).build().await?;
    info!(addr = %server.local_addr()?, "listening");

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }

    Ok(())
}
