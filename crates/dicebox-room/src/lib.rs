//! Room registry for Dicebox.
//!
//! Rooms live in one [`RoomRegistry`] owned by the server. Each room holds
//! at most two players and one authoritative [`GameState`](dicebox_game::GameState);
//! the registry is the only thing that mutates either.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: create/join rooms, check turns, route rolls and moves, evict
//! - [`Room`]: seats, game, and member channels for one session
//! - [`RoomPhase`]: lifecycle state machine
//! - [`RegistryConfig`]: board size limit and eviction timings

mod config;
mod error;
mod registry;
mod room;

pub use config::{RegistryConfig, RoomPhase};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{Player, PlayerSender, Room};
