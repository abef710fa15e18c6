//! Transport abstraction layer for Dicebox.
//!
//! Provides the [`Transport`], [`Handshake`] and [`Connection`] traits the
//! gateway is written against, and a WebSocket implementation of them.
//!
//! Accepting is split in two: [`Transport::accept`] only takes the next
//! TCP peer, and [`Handshake::complete`] runs the protocol upgrade. The
//! upgrade belongs on the per-connection task so a peer that never sends
//! its request cannot hold up the listener.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
mod origin;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use origin::OriginPolicy;
#[cfg(feature = "websocket")]
pub use websocket::{PendingWebSocket, WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// A peer that still has to finish its handshake.
    type Pending: Handshake<Connection = Self::Connection, Error = Self::Error>;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next peer. Performs no reads or writes on it.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;
}

/// The upgrade step between [`Transport::accept`] and a usable
/// [`Connection`].
pub trait Handshake: Send + 'static {
    /// The connection produced once the handshake succeeds.
    type Connection: Connection;
    /// The error type for a failed handshake.
    type Error: std::error::Error + Send + Sync;

    /// Remote address of the peer.
    fn peer_addr(&self) -> SocketAddr;

    /// Runs the handshake. Has no deadline of its own; callers bound it.
    async fn complete(self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive bytes.
///
/// `send` and `recv` must be callable concurrently from different tasks:
/// a broadcast can go out while the reader is parked on `recv`.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends data to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }
}
