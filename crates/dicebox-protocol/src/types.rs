//! Core protocol types for Dicebox's wire format.
//!
//! Everything here travels on the wire: clients send [`ClientIntent`]s,
//! the server answers with [`ServerEvent`]s, and both are wrapped in an
//! [`Envelope`] carrying a sequence number and a timestamp.
//!
//! Game data ([`GameState`], [`GameEvent`], [`Role`], ...) is defined by
//! `dicebox-game` and embedded here unchanged, so clients render exactly
//! what the server holds.

use std::fmt;

use dicebox_game::{BoardSize, GameEvent, GameState, LineKind, Role};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque handle for one connected client.
///
/// The gateway derives it from the transport's connection id; rooms use it
/// to address their members without knowing anything about sockets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A short, human-shareable room identifier such as `"K7QMRX"`.
///
/// Incoming codes are normalized (trimmed, upper-cased) but not validated:
/// a malformed code simply names no room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Characters a generated code is drawn from. Omits `0/O` and `1/I`
    /// so codes survive being read aloud.
    pub const ALPHABET: &'static [u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

    /// Length of a generated code.
    pub const LEN: usize = 6;

    /// Builds a code from alphabet indices (taken modulo the alphabet size).
    pub fn from_indices(indices: [usize; Self::LEN]) -> Self {
        let code = indices
            .iter()
            .map(|i| Self::ALPHABET[i % Self::ALPHABET.len()] as char)
            .collect();
        Self(code)
    }

    /// Returns `true` if this looks like a code the server could have issued.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == Self::LEN
            && self.0.bytes().all(|b| Self::ALPHABET.contains(&b))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomCode {
    fn from(raw: String) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }
}

impl From<&str> for RoomCode {
    fn from(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ClientIntent: what clients ask for
// ---------------------------------------------------------------------------

/// A request from a client. Clients never send state, only intents; the
/// server decides what they mean.
///
/// Internally tagged, so a move looks like:
/// `{ "type": "MakeMove", "room_id": "K7QMRX", "line_type": "HORIZONTAL", "row": 0, "col": 1 }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientIntent {
    /// Open a new room; the sender becomes seat `A`.
    CreateRoom { name: String, board_size: usize },

    /// Take seat `B` in an existing room.
    JoinRoom { room_id: RoomCode, name: String },

    /// Roll the die to start a turn.
    RollDice { room_id: RoomCode },

    /// Draw one line.
    MakeMove {
        room_id: RoomCode,
        line_type: LineKind,
        row: usize,
        col: usize,
    },

    /// Keep-alive. Echoed back with the server's clock.
    Heartbeat { client_time: u64 },

    /// The client is leaving.
    Disconnect { reason: String },
}

// ---------------------------------------------------------------------------
// ServerEvent: what the server tells clients
// ---------------------------------------------------------------------------

/// Public view of a seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub role: Role,
    pub name: String,
    /// `false` once the player's connection has gone away.
    pub connected: bool,
}

/// Everything a client needs to render a room from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: RoomCode,
    pub board_size: BoardSize,
    pub players: Vec<PlayerInfo>,
    pub game: GameState,
}

/// Request-level failure codes. Sent only to the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    RoomNotFound,
    RoomFull,
    NotYourTurn,
    NotInRoom,
    WaitingForOpponent,
    AlreadyInRoom,
    InvalidBoardSize,
    BadRequest,
}

/// A message from the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Reply to `CreateRoom`.
    RoomCreated {
        room_id: RoomCode,
        role: Role,
        board_size: BoardSize,
    },

    /// Full room state; broadcast when the second player sits down.
    RoomSnapshot(RoomSnapshot),

    /// State after an accepted roll or move, broadcast to the room.
    /// `events` is empty for a roll.
    GameUpdate {
        room_id: RoomCode,
        game: GameState,
        events: Vec<GameEvent>,
    },

    /// A member's connection went away.
    PlayerLeft {
        room_id: RoomCode,
        role: Role,
        name: String,
    },

    /// The room was evicted; the recipient is no longer seated.
    RoomClosed { room_id: RoomCode, reason: String },

    /// Reply to `Heartbeat`.
    HeartbeatAck { client_time: u64, server_time: u64 },

    /// The request failed. Nothing changed.
    Error { code: ErrorCode, message: String },
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The top-level frame. Every message on the wire is an `Envelope`.
///
/// ```text
/// { "seq": 42, "timestamp": 15000, "payload": { "type": "RollDice", ... } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<P> {
    /// Per-connection counter; each side keeps its own.
    #[serde(default)]
    pub seq: u64,

    /// Milliseconds since the sender's connection started.
    #[serde(default)]
    pub timestamp: u64,

    pub payload: P,
}

impl<P> Envelope<P> {
    pub fn new(seq: u64, timestamp: u64, payload: P) -> Self {
        Self {
            seq,
            timestamp,
            payload,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
