//! Error types for the room layer.

use dicebox_game::{MoveRejection, Role, RollRejection};
use dicebox_protocol::{ErrorCode, PlayerId, RoomCode};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room has this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// Both seats are taken.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// A connection sits in at most one room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomCode),

    /// The player holds no seat in this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomCode),

    /// Seat `B` is still empty.
    #[error("room {0} is waiting for an opponent")]
    WaitingForOpponent(RoomCode),

    /// The request came from the seat that isn't playing.
    #[error("not your turn: seat {current} is playing")]
    NotYourTurn { current: Role },

    /// Board size is zero or above the configured maximum.
    #[error("invalid board size {size}: must be between 1 and {max}")]
    InvalidBoardSize { size: usize, max: usize },

    /// The game refused the roll.
    #[error("roll rejected: {0}")]
    RollRejected(#[from] RollRejection),

    /// The game refused the move.
    #[error("move rejected: {0}")]
    MoveRejected(#[from] MoveRejection),
}

impl RoomError {
    /// Wire code for errors that are reported to the requester.
    ///
    /// Game rejections have no code: they are silent no-ops.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::NotFound(_) => Some(ErrorCode::RoomNotFound),
            Self::RoomFull(_) => Some(ErrorCode::RoomFull),
            Self::AlreadyInRoom(..) => Some(ErrorCode::AlreadyInRoom),
            Self::NotInRoom(..) => Some(ErrorCode::NotInRoom),
            Self::WaitingForOpponent(_) => Some(ErrorCode::WaitingForOpponent),
            Self::NotYourTurn { .. } => Some(ErrorCode::NotYourTurn),
            Self::InvalidBoardSize { .. } => Some(ErrorCode::InvalidBoardSize),
            Self::RollRejected(_) | Self::MoveRejected(_) => None,
        }
    }
}
