//! A single room: two seats, one game, and the members' outbound channels.

use std::time::Instant;

use dicebox_game::{BoardSize, GameState, Role};
use dicebox_protocol::{
    PlayerId, PlayerInfo, RoomCode, RoomSnapshot, ServerEvent,
};
use tokio::sync::mpsc;

use crate::{RoomError, RoomPhase};

/// Channel sender for delivering server events to one connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// A seated player.
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    role: Role,
    name: String,
    /// `None` once the connection has gone away.
    sender: Option<PlayerSender>,
}

impl Player {
    pub(crate) fn new(
        id: PlayerId,
        role: Role,
        name: String,
        sender: PlayerSender,
    ) -> Self {
        Self {
            id,
            role,
            name,
            sender: Some(sender),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_connected(&self) -> bool {
        self.sender.is_some()
    }

    fn info(&self) -> PlayerInfo {
        PlayerInfo {
            role: self.role,
            name: self.name.clone(),
            connected: self.is_connected(),
        }
    }
}

/// One game session. Owned by the [`RoomRegistry`](crate::RoomRegistry);
/// only the registry mutates it.
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    /// Seat order: index 0 is `A`, index 1 is `B`.
    players: Vec<Player>,
    pub(crate) game: GameState,
    pub(crate) last_activity: Instant,
    pub(crate) finished_at: Option<Instant>,
}

impl Room {
    pub(crate) fn new(
        code: RoomCode,
        size: BoardSize,
        owner: Player,
        now: Instant,
    ) -> Self {
        Self {
            code,
            players: vec![owner],
            game: GameState::new(size),
            last_activity: now,
            finished_at: None,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn board_size(&self) -> BoardSize {
        self.game.board_size()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn phase(&self) -> RoomPhase {
        if self.game.is_finished() {
            RoomPhase::Finished
        } else if self.players.len() < 2 {
            RoomPhase::WaitingForOpponent
        } else {
            RoomPhase::InProgress
        }
    }

    /// The seat `player` holds here, if any.
    pub fn role_of(&self, player: PlayerId) -> Option<Role> {
        self.players
            .iter()
            .find(|p| p.id == player)
            .map(|p| p.role)
    }

    /// Number of members whose connection is still open.
    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_connected()).count()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.code.clone(),
            board_size: self.board_size(),
            players: self.players.iter().map(Player::info).collect(),
            game: self.game.clone(),
        }
    }

    /// Seats a second player as `B`.
    pub(crate) fn seat(
        &mut self,
        id: PlayerId,
        name: String,
        sender: PlayerSender,
    ) -> Result<Role, RoomError> {
        if !self.phase().is_joinable() {
            return Err(RoomError::RoomFull(self.code.clone()));
        }
        let role = Role::B;
        self.players.push(Player::new(id, role, name, sender));
        Ok(role)
    }

    /// Drops a member's outbound channel. The seat stays taken.
    pub(crate) fn disconnect(&mut self, id: PlayerId) -> Option<&Player> {
        let player = self.players.iter_mut().find(|p| p.id == id)?;
        player.sender = None;
        Some(player)
    }

    /// Sends `event` to every connected member.
    pub(crate) fn broadcast(&self, event: ServerEvent) {
        for player in &self.players {
            send(player, event.clone());
        }
    }
}

/// Delivers to one player. A closed receiver means the connection task
/// has already ended; its guard will unseat the player.
fn send(player: &Player, event: ServerEvent) {
    if let Some(sender) = &player.sender {
        let _ = sender.send(event);
    }
}
