//! Registry configuration and the room phase machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Limits and eviction timings for a [`RoomRegistry`](crate::RoomRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Largest board a room may be created with.
    pub max_board_size: usize,

    /// How long a finished game stays around so players can see the result.
    pub finished_ttl: Duration,

    /// How long a room may go without an accepted intent before eviction.
    pub idle_ttl: Duration,

    /// Display names are cut to this many characters.
    pub max_name_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_board_size: 12,
            finished_ttl: Duration::from_secs(5 * 60),
            idle_ttl: Duration::from_secs(30 * 60),
            max_name_len: 24,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomPhase
// ---------------------------------------------------------------------------

/// Where a room is in its life.
///
/// ```text
/// WaitingForOpponent → InProgress → Finished
/// ```
///
/// - **WaitingForOpponent**: only seat `A` is taken. Joinable.
/// - **InProgress**: both seats taken, no winner yet.
/// - **Finished**: every square is owned. Kept until `finished_ttl`
///   elapses or everyone leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomPhase {
    WaitingForOpponent,
    InProgress,
    Finished,
}

impl RoomPhase {
    /// Returns `true` if the room is accepting a second player.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::WaitingForOpponent)
    }

    /// Returns `true` if rolls and moves are being played.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl std::fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForOpponent => write!(f, "WaitingForOpponent"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_phase_is_joinable() {
        assert!(RoomPhase::WaitingForOpponent.is_joinable());
        assert!(!RoomPhase::InProgress.is_joinable());
        assert!(!RoomPhase::Finished.is_joinable());
    }

    #[test]
    fn test_room_phase_is_active() {
        assert!(!RoomPhase::WaitingForOpponent.is_active());
        assert!(RoomPhase::InProgress.is_active());
        assert!(!RoomPhase::Finished.is_active());
    }

    #[test]
    fn test_room_phase_display() {
        assert_eq!(RoomPhase::InProgress.to_string(), "InProgress");
    }

    #[test]
    fn test_registry_config_default() {
        let config = RegistryConfig::default();
        assert_eq!(config.max_board_size, 12);
        assert_eq!(config.finished_ttl, Duration::from_secs(300));
        assert!(config.idle_ttl > config.finished_ttl);
    }
}
