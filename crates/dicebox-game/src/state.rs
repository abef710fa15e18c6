//! The authoritative per-room game state and its rules.
//!
//! A turn is: roll the die (1..=N), then draw exactly that many lines.
//! Closing a square scores it for the current player but does not grant
//! an extra move. The game ends the moment every square is owned, which
//! may happen mid-turn.
//!
//! Every operation validates fully before it mutates, so a rejected
//! request leaves the state exactly as it was.

use std::cmp::Ordering;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::{
    BoardSize, Line, LineKind, Square, candidate_squares, is_square_closed,
    line_in_bounds,
};
use crate::{MoveRejection, RollRejection};

// ---------------------------------------------------------------------------
// Roles, scores, outcome
// ---------------------------------------------------------------------------

/// One of the two seats at the table. The room creator is always `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    A,
    B,
}

impl Role {
    /// The opposing seat.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// Final result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    A,
    B,
    Draw,
}

/// Squares owned per seat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(rename = "A")]
    pub a: u32,
    #[serde(rename = "B")]
    pub b: u32,
}

impl Scores {
    pub fn get(&self, role: Role) -> u32 {
        match role {
            Role::A => self.a,
            Role::B => self.b,
        }
    }

    pub fn total(&self) -> u32 {
        self.a + self.b
    }

    fn increment(&mut self, role: Role) {
        match role {
            Role::A => self.a += 1,
            Role::B => self.b += 1,
        }
    }

    fn leader(&self) -> Winner {
        match self.a.cmp(&self.b) {
            Ordering::Greater => Winner::A,
            Ordering::Less => Winner::B,
            Ordering::Equal => Winner::Draw,
        }
    }
}

// ---------------------------------------------------------------------------
// GameEvent
// ---------------------------------------------------------------------------

/// Something that happened as a result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A square's fourth edge was drawn.
    SquareClaimed { square: Square, by: Role },
    /// The turn's moves ran out; the other seat must roll next.
    TurnChanged { to: Role },
    /// Every square is owned.
    GameWon { winner: Winner },
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Full authoritative state of one game. Sent to clients as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    board_size: BoardSize,
    horizontal_lines: Vec<Vec<bool>>,
    vertical_lines: Vec<Vec<bool>>,
    squares: Vec<Vec<Option<Role>>>,
    current_player: Role,
    scores: Scores,
    moves_left: u32,
    dice_value: Option<u32>,
    waiting_for_roll: bool,
    winner: Option<Winner>,
}

impl GameState {
    /// A fresh game: nothing drawn, `A` to roll.
    pub fn new(size: BoardSize) -> Self {
        let n = size.get();
        Self {
            board_size: size,
            horizontal_lines: vec![vec![false; n]; n + 1],
            vertical_lines: vec![vec![false; n + 1]; n],
            squares: vec![vec![None; n]; n],
            current_player: Role::A,
            scores: Scores::default(),
            moves_left: 0,
            dice_value: None,
            waiting_for_roll: true,
            winner: None,
        }
    }

    pub fn board_size(&self) -> BoardSize {
        self.board_size
    }

    pub fn horizontal_lines(&self) -> &[Vec<bool>] {
        &self.horizontal_lines
    }

    pub fn vertical_lines(&self) -> &[Vec<bool>] {
        &self.vertical_lines
    }

    pub fn squares(&self) -> &[Vec<Option<Role>>] {
        &self.squares
    }

    pub fn current_player(&self) -> Role {
        self.current_player
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    pub fn dice_value(&self) -> Option<u32> {
        self.dice_value
    }

    pub fn waiting_for_roll(&self) -> bool {
        self.waiting_for_roll
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// Whether `line` is drawn. Out-of-range lines read as not drawn.
    pub fn line_drawn(&self, line: Line) -> bool {
        let grid = match line.kind {
            LineKind::Horizontal => &self.horizontal_lines,
            LineKind::Vertical => &self.vertical_lines,
        };
        grid.get(line.row)
            .and_then(|row| row.get(line.col))
            .copied()
            .unwrap_or(false)
    }

    /// Owner of `square`, if claimed.
    pub fn square_owner(&self, square: Square) -> Option<Role> {
        self.squares
            .get(square.row)
            .and_then(|row| row.get(square.col))
            .copied()
            .flatten()
    }

    /// Number of owned squares.
    pub fn claimed_count(&self) -> usize {
        self.squares
            .iter()
            .flatten()
            .filter(|owner| owner.is_some())
            .count()
    }

    /// Highest face of the die: the board size.
    pub fn die_faces(&self) -> u32 {
        u32::try_from(self.board_size.get()).unwrap_or(u32::MAX)
    }

    // -----------------------------------------------------------------------
    // Dice
    // -----------------------------------------------------------------------

    /// Rolls a die with faces `1..=N` and starts the current player's moves.
    pub fn roll_dice<R: Rng>(
        &mut self,
        rng: &mut R,
    ) -> Result<u32, RollRejection> {
        self.check_can_roll()?;
        let value = rng.random_range(1..=self.die_faces());
        self.apply_roll(value)?;
        Ok(value)
    }

    /// Applies an already-drawn roll value.
    pub fn apply_roll(&mut self, value: u32) -> Result<(), RollRejection> {
        self.check_can_roll()?;
        let max = self.die_faces();
        if value == 0 || value > max {
            return Err(RollRejection::OutOfRange { value, max });
        }

        self.dice_value = Some(value);
        self.moves_left = value;
        self.waiting_for_roll = false;
        Ok(())
    }

    fn check_can_roll(&self) -> Result<(), RollRejection> {
        if self.winner.is_some() {
            return Err(RollRejection::GameOver);
        }
        if !self.waiting_for_roll {
            return Err(RollRejection::AlreadyRolled);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------------

    /// Draws `line` for the current player.
    ///
    /// Returns the events the move produced, in order: claimed squares,
    /// then a turn change if the moves ran out, then the result if the
    /// board is full.
    pub fn make_move(
        &mut self,
        line: Line,
    ) -> Result<Vec<GameEvent>, MoveRejection> {
        if self.winner.is_some() {
            return Err(MoveRejection::GameOver);
        }
        if self.waiting_for_roll {
            return Err(MoveRejection::MustRoll);
        }
        if self.moves_left == 0 {
            return Err(MoveRejection::NoMovesLeft);
        }
        if !line_in_bounds(self.board_size, line) {
            return Err(MoveRejection::OutOfBounds);
        }
        if self.line_drawn(line) {
            return Err(MoveRejection::AlreadyDrawn);
        }

        match line.kind {
            LineKind::Horizontal => {
                self.horizontal_lines[line.row][line.col] = true
            }
            LineKind::Vertical => self.vertical_lines[line.row][line.col] = true,
        }
        self.moves_left -= 1;

        let mut events = Vec::new();
        let player = self.current_player;

        for square in candidate_squares(self.board_size, line) {
            let cell = &mut self.squares[square.row][square.col];
            if cell.is_none()
                && is_square_closed(
                    &self.horizontal_lines,
                    &self.vertical_lines,
                    square,
                )
            {
                *cell = Some(player);
                self.scores.increment(player);
                events.push(GameEvent::SquareClaimed { square, by: player });
            }
        }

        if self.moves_left == 0 {
            self.current_player = player.other();
            self.waiting_for_roll = true;
            self.dice_value = None;
            events.push(GameEvent::TurnChanged {
                to: self.current_player,
            });
        }

        if self.scores.total() as usize == self.board_size.square_count() {
            let winner = self.scores.leader();
            self.moves_left = 0;
            self.waiting_for_roll = false;
            self.winner = Some(winner);
            events.push(GameEvent::GameWon { winner });
        }

        Ok(events)
    }
}
