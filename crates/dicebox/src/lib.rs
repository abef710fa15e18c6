//! # Dicebox
//!
//! Authoritative server for two-player dice dots-and-boxes.
//!
//! Clients connect over WebSocket and send intents (create a room, join
//! one, roll, draw a line). The server validates each intent against the
//! room's game state, applies it, and broadcasts the result to both
//! players. Clients never send state.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dicebox::prelude::*;
//!
//! # async fn start() -> Result<(), DiceboxError> {
//! let server = DiceboxServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::DiceboxError;
pub use server::{DiceboxServer, DiceboxServerBuilder};

/// Convenience re-exports for building and talking to a Dicebox server.
pub mod prelude {
    pub use crate::{
        DiceboxError, DiceboxServer, DiceboxServerBuilder, ServerConfig,
    };
    pub use dicebox_game::{
        BoardSize, GameEvent, GameState, Line, LineKind, Role, Scores,
        Winner,
    };
    pub use dicebox_protocol::{
        ClientIntent, Codec, Envelope, ErrorCode, JsonCodec, PlayerInfo,
        RoomCode, RoomSnapshot, ServerEvent,
    };
    pub use dicebox_room::{RegistryConfig, RoomRegistry};
    pub use dicebox_transport::OriginPolicy;
}
