//! Codec trait and implementations for serializing/deserializing frames.
//!
//! The gateway doesn't care how envelopes become bytes; it holds
//! something implementing [`Codec`]. [`JsonCodec`] is the only
//! implementation today because browser clients speak JSON.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` because one codec instance lives in the shared
/// server state and is used from every connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// ## Example
///
/// ```rust
/// use dicebox_protocol::{ClientIntent, Codec, Envelope, JsonCodec, RoomCode};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::new(
///     1,
///     5000,
///     ClientIntent::RollDice { room_id: RoomCode::from("K7QMRX") },
/// );
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope<ClientIntent> = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
