//! `DiceboxServer` builder and server loop.
//!
//! This is the entry point for running a Dicebox server. It ties together
//! all the layers: transport → protocol → room registry → game.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dicebox_protocol::{Codec, JsonCodec};
use dicebox_room::{RegistryConfig, RoomRegistry};
use dicebox_transport::{
    Handshake, OriginPolicy, PendingWebSocket, Transport, TransportError,
    WebSocketTransport,
};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{DiceboxError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Every intent that touches a room takes the registry lock for the
/// duration of the operation, so no task ever sees a half-applied move.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Dicebox server.
///
/// # Example
///
/// ```rust,no_run
/// use dicebox::prelude::*;
///
/// # async fn start() -> Result<(), DiceboxError> {
/// let server = DiceboxServer::builder()
///     .bind("0.0.0.0:8080")
///     .allowed_origins(OriginPolicy::parse("https://play.example.com")?)
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct DiceboxServerBuilder {
    config: ServerConfig,
    registry: Option<RoomRegistry>,
}

impl DiceboxServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            registry: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets which browser origins may connect.
    pub fn allowed_origins(mut self, origins: OriginPolicy) -> Self {
        self.config.origins = origins;
        self
    }

    /// Sets the registry limits and eviction timings.
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.config.registry = config;
        self
    }

    /// Sets how long a silent connection is kept open.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Sets how long a new peer has to finish the WebSocket handshake.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    /// Sets how often expired rooms are swept.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    /// Uses a prepared registry (e.g. one with a seeded RNG) instead of
    /// building one from the registry config.
    pub fn registry(mut self, registry: RoomRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<DiceboxServer<JsonCodec>, DiceboxError> {
        let ServerConfig {
            bind_addr,
            origins,
            registry: registry_config,
            sweep_interval,
            idle_timeout,
            handshake_timeout,
        } = self.config;

        let transport = WebSocketTransport::bind(&bind_addr, origins).await?;
        let registry = self
            .registry
            .unwrap_or_else(|| RoomRegistry::new(registry_config));

        let state = Arc::new(ServerState {
            rooms: Mutex::new(registry),
            codec: JsonCodec,
            idle_timeout,
        });

        Ok(DiceboxServer {
            transport,
            state,
            sweep_interval,
            handshake_timeout,
        })
    }
}

impl Default for DiceboxServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Dicebox server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct DiceboxServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    sweep_interval: Duration,
    handshake_timeout: Duration,
}

impl DiceboxServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> DiceboxServerBuilder {
        DiceboxServerBuilder::new()
    }
}

impl<C: Codec> DiceboxServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns the room sweeper, then a task for each accepted peer that
    /// finishes its handshake and runs the connection handler. Runs until
    /// the process is terminated.
    pub async fn run(mut self) -> Result<(), DiceboxError> {
        tracing::info!("dicebox server running");

        if !self.sweep_interval.is_zero() {
            tokio::spawn(sweep_rooms(
                Arc::clone(&self.state),
                self.sweep_interval,
            ));
        }

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    tokio::spawn(serve_peer(
                        pending,
                        Arc::clone(&self.state),
                        self.handshake_timeout,
                    ));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Upgrades one peer within `deadline`, then hands it to the handler.
async fn serve_peer<C: Codec>(
    pending: PendingWebSocket,
    state: Arc<ServerState<C>>,
    deadline: Duration,
) {
    let peer = pending.peer_addr();
    let conn = match tokio::time::timeout(deadline, pending.complete()).await {
        Ok(Ok(conn)) => conn,
        Ok(Err(TransportError::OriginRejected(_))) => {
            tracing::warn!(%peer, "refused connection from origin");
            return;
        }
        Ok(Err(e)) => {
            tracing::debug!(%peer, error = %e, "handshake failed");
            return;
        }
        Err(_) => {
            tracing::debug!(%peer, "handshake timed out");
            return;
        }
    };

    if let Err(e) = handle_connection(conn, state).await {
        tracing::debug!(%peer, error = %e, "connection ended with error");
    }
}

/// Periodically evicts finished and idle rooms.
async fn sweep_rooms<C: Codec>(state: Arc<ServerState<C>>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let mut rooms = state.rooms.lock().await;
        let removed = rooms.sweep(Instant::now());
        if removed > 0 {
            tracing::info!(
                removed,
                remaining = rooms.room_count(),
                "swept expired rooms"
            );
        }
    }
}
