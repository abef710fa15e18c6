//! Unified error type for the Dicebox server.

use dicebox_protocol::ProtocolError;
use dicebox_room::RoomError;
use dicebox_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum DiceboxError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, full, not your turn).
    #[error(transparent)]
    Room(#[from] RoomError),
}
