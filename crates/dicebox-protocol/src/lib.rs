//! Wire protocol for Dicebox.
//!
//! - **Types** ([`Envelope`], [`ClientIntent`], [`ServerEvent`], ...):
//!   the messages that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Room Registry (game state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientIntent, Envelope, ErrorCode, PlayerId, PlayerInfo, RoomCode,
    RoomSnapshot, ServerEvent,
};
