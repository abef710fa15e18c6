//! Error and rejection types for the game layer.

/// Errors raised while setting up a game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Board size must be a positive integer.
    #[error("invalid board size {0}: must be at least 1")]
    InvalidBoardSize(usize),
}

/// Why a line draw was refused. A refused move leaves the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveRejection {
    /// A winner has been decided.
    #[error("game is over")]
    GameOver,

    /// The current player has not rolled yet.
    #[error("must roll the dice before drawing")]
    MustRoll,

    /// The turn's moves are spent.
    #[error("no moves left this turn")]
    NoMovesLeft,

    /// The line does not exist on this board.
    #[error("line is outside the board")]
    OutOfBounds,

    /// The line was drawn earlier.
    #[error("line already drawn")]
    AlreadyDrawn,
}

/// Why a dice roll was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RollRejection {
    /// A winner has been decided.
    #[error("game is over")]
    GameOver,

    /// The dice were already rolled this turn.
    #[error("dice already rolled this turn")]
    AlreadyRolled,

    /// The value is not a face of the board-sized die.
    #[error("roll {value} outside 1..={max}")]
    OutOfRange { value: u32, max: u32 },
}
