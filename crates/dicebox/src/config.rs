//! Server configuration.

use std::time::Duration;

use dicebox_room::RegistryConfig;
use dicebox_transport::OriginPolicy;

/// Everything the server needs to start.
///
/// `Default` gives a local development server; the binary fills this in
/// from command-line flags and environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on, e.g. `"0.0.0.0:8080"`.
    pub bind_addr: String,

    /// Browser origins allowed to connect.
    pub origins: OriginPolicy,

    /// Board size limit and room eviction timings.
    pub registry: RegistryConfig,

    /// How often finished and idle rooms are swept. Zero disables sweeping.
    pub sweep_interval: Duration,

    /// A connection that sends nothing for this long is closed.
    pub idle_timeout: Duration,

    /// A peer that hasn't finished the WebSocket upgrade by then is dropped.
    pub handshake_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            origins: OriginPolicy::Any,
            registry: RegistryConfig::default(),
            sweep_interval: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(60),
            handshake_timeout: Duration::from_secs(10),
        }
    }
}
