//! Command-line interface for the dicebox server.
//!
//! Every flag can also come from the environment (or a `.env` file).

use std::time::Duration;

use clap::Parser;
use dicebox::prelude::*;

/// Dicebox - authoritative server for dice dots-and-boxes
#[derive(Parser, Debug)]
#[command(name = "dicebox")]
#[command(about = "Authoritative game server for dice dots-and-boxes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Host to bind to
    #[arg(long, env = "DICEBOX_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind to
    #[arg(short, long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Allowed browser origins: `*` or a comma-separated list
    #[arg(long, env = "DICEBOX_ALLOWED_ORIGINS", default_value = "*")]
    pub allowed_origins: OriginPolicy,

    /// Largest board size a room may be created with (1 to 64)
    #[arg(
        long,
        env = "DICEBOX_MAX_BOARD_SIZE",
        default_value = "12",
        value_parser = clap::value_parser!(u16).range(1..=64)
    )]
    pub max_board_size: u16,

    /// Seconds a finished game is kept before its room is closed
    #[arg(long, env = "DICEBOX_FINISHED_TTL_SECS", default_value = "300")]
    pub finished_ttl_secs: u64,

    /// Seconds a room may go without a roll, move, or join before it is closed
    #[arg(long, env = "DICEBOX_IDLE_TTL_SECS", default_value = "1800")]
    pub idle_ttl_secs: u64,

    /// Seconds of silence after which a connection is dropped
    #[arg(long, env = "DICEBOX_IDLE_TIMEOUT_SECS", default_value = "60")]
    pub idle_timeout_secs: u64,
}

impl Cli {
    /// Builds the server configuration from the parsed flags.
    pub fn into_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            bind_addr: format!("{}:{}", self.host, self.port),
            origins: self.allowed_origins,
            registry: RegistryConfig {
                max_board_size: usize::from(self.max_board_size),
                finished_ttl: Duration::from_secs(self.finished_ttl_secs),
                idle_ttl: Duration::from_secs(self.idle_ttl_secs),
                ..defaults.registry
            },
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            ..defaults
        }
    }
}
