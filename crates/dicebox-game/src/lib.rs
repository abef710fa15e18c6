//! Game rules for Dicebox: a two-player, dice-driven dots-and-boxes.
//!
//! This crate is pure: no I/O, no async, no clocks. Randomness is
//! injected through [`rand::Rng`] so every rule can be exercised
//! deterministically.
//!
//! # Key types
//!
//! - [`GameState`]: one room's authoritative state and its operations
//! - [`Line`], [`Square`], [`BoardSize`]: board addressing
//! - [`GameEvent`]: what an accepted move produced
//! - [`MoveRejection`], [`RollRejection`]: why a request was refused

mod error;
pub mod geometry;
mod state;

pub use error::{GameError, MoveRejection, RollRejection};
pub use geometry::{BoardSize, Line, LineKind, Square};
pub use state::{GameEvent, GameState, Role, Scores, Winner};
