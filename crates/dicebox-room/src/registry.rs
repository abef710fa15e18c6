//! Room registry: creates rooms, seats players, routes game intents, and
//! evicts rooms nobody needs any more.

use std::collections::HashMap;
use std::time::Instant;

use dicebox_game::{BoardSize, GameEvent, Line, Role};
use dicebox_protocol::{PlayerId, RoomCode, RoomSnapshot, ServerEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::room::{Player, PlayerSender, Room};
use crate::{RegistryConfig, RoomError, RoomPhase};

/// Every room on the server and which player sits where.
///
/// The registry is a plain owned value. The server wraps it in a mutex;
/// tests drive it directly. All randomness (room codes and dice) comes from
/// the registry's own RNG so a seeded registry replays identically.
pub struct RoomRegistry {
    /// Active rooms, keyed by code.
    rooms: HashMap<RoomCode, Room>,

    /// Maps each connected player to the room they sit in.
    /// A player is in at most ONE room at a time.
    player_rooms: HashMap<PlayerId, RoomCode>,

    config: RegistryConfig,
    rng: StdRng,
}

impl RoomRegistry {
    /// Creates an empty registry seeded from the OS.
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Creates an empty registry drawing from `rng`.
    pub fn with_rng(config: RegistryConfig, rng: StdRng) -> Self {
        Self {
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            config,
            rng,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Create / join
    // -----------------------------------------------------------------------

    /// Opens a room with `player` in seat `A` and tells them its code.
    pub fn create_room(
        &mut self,
        player: PlayerId,
        name: &str,
        board_size: usize,
        sender: PlayerSender,
    ) -> Result<(RoomCode, Role), RoomError> {
        let max = self.config.max_board_size;
        let size = BoardSize::new(board_size)
            .ok()
            .filter(|s| s.get() <= max)
            .ok_or(RoomError::InvalidBoardSize {
                size: board_size,
                max,
            })?;

        if let Some(current) = self.player_rooms.get(&player) {
            return Err(RoomError::AlreadyInRoom(player, current.clone()));
        }

        let code = self.generate_code();
        let role = Role::A;
        let owner =
            Player::new(player, role, self.display_name(name, role), sender);
        let room = Room::new(code.clone(), size, owner, Instant::now());
        room.broadcast(ServerEvent::RoomCreated {
            room_id: code.clone(),
            role,
            board_size: size,
        });

        self.rooms.insert(code.clone(), room);
        self.player_rooms.insert(player, code.clone());
        tracing::info!(room_id = %code, %player, %size, "room created");
        Ok((code, role))
    }

    /// Seats `player` as `B` and broadcasts the ready room to both members.
    pub fn join_room(
        &mut self,
        code: &RoomCode,
        player: PlayerId,
        name: &str,
        sender: PlayerSender,
    ) -> Result<RoomSnapshot, RoomError> {
        if !self.rooms.contains_key(code) {
            return Err(RoomError::NotFound(code.clone()));
        }
        if let Some(current) = self.player_rooms.get(&player) {
            return Err(RoomError::AlreadyInRoom(player, current.clone()));
        }

        let name = self.display_name(name, Role::B);
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let role = room.seat(player, name, sender)?;
        room.last_activity = Instant::now();

        let snapshot = room.snapshot();
        room.broadcast(ServerEvent::RoomSnapshot(snapshot.clone()));
        self.player_rooms.insert(player, code.clone());
        tracing::info!(room_id = %code, %player, %role, "player joined");
        Ok(snapshot)
    }

    // -----------------------------------------------------------------------
    // Turns
    // -----------------------------------------------------------------------

    /// Checks that `player` may act in `code` right now and returns their
    /// seat.
    ///
    /// A finished game passes: the state machine itself refuses further
    /// rolls and moves.
    pub fn authorize_turn(
        &self,
        code: &RoomCode,
        player: PlayerId,
    ) -> Result<Role, RoomError> {
        let room = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let role = room
            .role_of(player)
            .ok_or_else(|| RoomError::NotInRoom(player, code.clone()))?;

        match room.phase() {
            RoomPhase::WaitingForOpponent => {
                Err(RoomError::WaitingForOpponent(code.clone()))
            }
            phase
                if phase.is_active() && room.game.current_player() != role =>
            {
                Err(RoomError::NotYourTurn {
                    current: room.game.current_player(),
                })
            }
            _ => Ok(role),
        }
    }

    /// Rolls the die for the room's current player and broadcasts the
    /// new state.
    pub fn roll_dice(&mut self, code: &RoomCode) -> Result<u32, RoomError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let value = room.game.roll_dice(&mut self.rng)?;
        room.last_activity = Instant::now();
        tracing::debug!(
            room_id = %code,
            player = %room.game.current_player(),
            value,
            "dice rolled"
        );

        room.broadcast(ServerEvent::GameUpdate {
            room_id: code.clone(),
            game: room.game.clone(),
            events: Vec::new(),
        });
        Ok(value)
    }

    /// Draws `line` for the room's current player and broadcasts the new
    /// state along with what the move caused.
    pub fn make_move(
        &mut self,
        code: &RoomCode,
        line: Line,
    ) -> Result<Vec<GameEvent>, RoomError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let player = room.game.current_player();
        let events = room.game.make_move(line)?;
        let now = Instant::now();
        room.last_activity = now;
        tracing::debug!(room_id = %code, %player, %line, "line drawn");

        if let Some(winner) = room.game.winner() {
            room.finished_at = Some(now);
            let scores = room.game.scores();
            tracing::info!(
                room_id = %code,
                ?winner,
                a = scores.a,
                b = scores.b,
                "game finished"
            );
        }

        room.broadcast(ServerEvent::GameUpdate {
            room_id: code.clone(),
            game: room.game.clone(),
            events: events.clone(),
        });
        Ok(events)
    }

    // -----------------------------------------------------------------------
    // Departure and eviction
    // -----------------------------------------------------------------------

    /// Handles a player's connection going away.
    ///
    /// The seat stays taken and the others are told. Once no member is
    /// connected the room is removed. Returns the room the player was in.
    pub fn leave(&mut self, player: PlayerId) -> Option<RoomCode> {
        let code = self.player_rooms.remove(&player)?;
        let room = self.rooms.get_mut(&code)?;

        let (role, name) = {
            let left = room.disconnect(player)?;
            (left.role(), left.name().to_owned())
        };
        tracing::info!(room_id = %code, %player, %role, "player left");

        if room.connected_count() == 0 {
            self.remove_room(&code);
            tracing::info!(room_id = %code, "room removed: no players left");
        } else {
            room.broadcast(ServerEvent::PlayerLeft {
                room_id: code.clone(),
                role,
                name,
            });
        }
        Some(code)
    }

    /// Evicts finished rooms past `finished_ttl` and rooms idle past
    /// `idle_ttl`. Connected members get `RoomClosed` and are unseated.
    ///
    /// Returns the number of rooms removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let expired: Vec<(RoomCode, &'static str)> = self
            .rooms
            .values()
            .filter_map(|room| {
                let finished_for = room
                    .finished_at
                    .map(|at| now.saturating_duration_since(at));
                if finished_for.is_some_and(|d| d >= self.config.finished_ttl)
                {
                    return Some((room.code().clone(), "game finished"));
                }
                let idle_for = now.saturating_duration_since(room.last_activity);
                (idle_for >= self.config.idle_ttl)
                    .then(|| (room.code().clone(), "idle timeout"))
            })
            .collect();

        for (code, reason) in &expired {
            if let Some(room) = self.remove_room(code) {
                room.broadcast(ServerEvent::RoomClosed {
                    room_id: code.clone(),
                    reason: (*reason).to_owned(),
                });
            }
            tracing::info!(room_id = %code, reason, "room evicted");
        }
        expired.len()
    }

    fn remove_room(&mut self, code: &RoomCode) -> Option<Room> {
        let room = self.rooms.remove(code)?;
        for player in room.players() {
            if self.player_rooms.get(&player.id()) == Some(code) {
                self.player_rooms.remove(&player.id());
            }
        }
        Some(room)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn snapshot(&self, code: &RoomCode) -> Option<RoomSnapshot> {
        self.rooms.get(code).map(Room::snapshot)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// The room `player` currently sits in.
    pub fn player_room(&self, player: PlayerId) -> Option<&RoomCode> {
        self.player_rooms.get(&player)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Draws codes until one is free. With 32^6 codes a retry is rare.
    fn generate_code(&mut self) -> RoomCode {
        loop {
            let rng = &mut self.rng;
            let code = RoomCode::from_indices(std::array::from_fn(|_| {
                rng.random_range(0..RoomCode::ALPHABET.len())
            }));
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }

    fn display_name(&self, raw: &str, role: Role) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return format!("Player {role}");
        }
        trimmed.chars().take(self.config.max_name_len).collect()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
