//! Integration tests for the room registry.

use std::time::{Duration, Instant};

use dicebox_game::{
    GameEvent, Line, MoveRejection, Role, RollRejection, Winner,
};
use dicebox_protocol::{PlayerId, RoomCode, ServerEvent};
use dicebox_room::{RegistryConfig, RoomError, RoomPhase, RoomRegistry};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;

type Inbox = mpsc::UnboundedReceiver<ServerEvent>;

const ALICE: PlayerId = PlayerId(1);
const BOB: PlayerId = PlayerId(2);
const CAROL: PlayerId = PlayerId(3);

fn registry() -> RoomRegistry {
    RoomRegistry::with_rng(RegistryConfig::default(), StdRng::seed_from_u64(42))
}

fn drain(inbox: &mut Inbox) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = inbox.try_recv() {
        events.push(event);
    }
    events
}

/// Creates a room of `size` with Alice as `A` and Bob as `B`.
fn two_player_room(
    reg: &mut RoomRegistry,
    size: usize,
) -> (RoomCode, Inbox, Inbox) {
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let (code, _) = reg.create_room(ALICE, "alice", size, tx_a).unwrap();
    reg.join_room(&code, BOB, "bob", tx_b).unwrap();
    drain(&mut rx_a);
    drain(&mut rx_b);
    (code, rx_a, rx_b)
}

// =========================================================================
// Create / join
// =========================================================================

#[test]
fn test_create_room_seats_owner_as_a() {
    let mut reg = registry();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (code, role) = reg.create_room(ALICE, "alice", 4, tx).unwrap();

    assert_eq!(role, Role::A);
    assert!(code.is_well_formed());
    assert_eq!(reg.player_room(ALICE), Some(&code));
    assert!(matches!(
        drain(&mut rx).as_slice(),
        [ServerEvent::RoomCreated { room_id, role: Role::A, board_size }]
            if *room_id == code && board_size.get() == 4
    ));

    let room = reg.room(&code).unwrap();
    assert_eq!(room.phase(), RoomPhase::WaitingForOpponent);
    assert_eq!(room.board_size().get(), 4);
    assert_eq!(room.players()[0].name(), "alice");
    assert!(room.game().waiting_for_roll());
}

#[test]
fn test_create_room_twice_is_already_in_room() {
    let mut reg = registry();
    let (tx, _rx) = mpsc::unbounded_channel();
    let (code, _) = reg.create_room(ALICE, "alice", 3, tx).unwrap();

    let (tx, _rx2) = mpsc::unbounded_channel();
    let err = reg.create_room(ALICE, "alice", 3, tx).unwrap_err();
    assert!(matches!(err, RoomError::AlreadyInRoom(p, c) if p == ALICE && c == code));
    assert_eq!(reg.room_count(), 1);
}

#[test]
fn test_join_room_not_found_changes_nothing() {
    let mut reg = registry();
    let (tx, _rx) = mpsc::unbounded_channel();
    let (code, _) = reg.create_room(ALICE, "alice", 3, tx).unwrap();
    let before = reg.snapshot(&code).unwrap();

    let (tx, _rx2) = mpsc::unbounded_channel();
    let missing = RoomCode::from("ZZZZZZ");
    let err = reg.join_room(&missing, BOB, "bob", tx).unwrap_err();

    assert!(matches!(err, RoomError::NotFound(c) if c == missing));
    assert_eq!(reg.room_count(), 1);
    assert!(reg.player_room(BOB).is_none());
    assert_eq!(reg.snapshot(&code).unwrap(), before);
}

#[test]
fn test_join_room_broadcasts_snapshot_to_both() {
    let mut reg = registry();
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let (code, _) = reg.create_room(ALICE, "alice", 3, tx_a).unwrap();
    drain(&mut rx_a);

    // Lower-case input names the same room.
    let lower = RoomCode::from(code.as_str().to_lowercase());
    let snapshot = reg.join_room(&lower, BOB, "bob", tx_b).unwrap();

    assert_eq!(snapshot.room_id, code);
    assert_eq!(snapshot.players.len(), 2);
    assert_eq!(snapshot.players[1].role, Role::B);
    assert_eq!(snapshot.players[1].name, "bob");
    assert!(snapshot.game.waiting_for_roll());

    for inbox in [&mut rx_a, &mut rx_b] {
        let events = drain(inbox);
        assert_eq!(events, vec![ServerEvent::RoomSnapshot(snapshot.clone())]);
    }
    assert_eq!(reg.room(&code).unwrap().phase(), RoomPhase::InProgress);
}

#[test]
fn test_join_full_room_is_rejected() {
    let mut reg = registry();
    let (code, mut rx_a, mut rx_b) = two_player_room(&mut reg, 3);

    let (tx_c, mut rx_c) = mpsc::unbounded_channel();
    let err = reg.join_room(&code, CAROL, "carol", tx_c).unwrap_err();

    assert!(matches!(err, RoomError::RoomFull(_)));
    assert!(reg.player_room(CAROL).is_none());
    assert_eq!(reg.room(&code).unwrap().players().len(), 2);
    assert!(drain(&mut rx_a).is_empty());
    assert!(drain(&mut rx_b).is_empty());
    assert!(drain(&mut rx_c).is_empty());
}

#[test]
fn test_join_own_room_is_already_in_room() {
    let mut reg = registry();
    let (tx, _rx) = mpsc::unbounded_channel();
    let (code, _) = reg.create_room(ALICE, "alice", 3, tx).unwrap();

    let (tx, _rx2) = mpsc::unbounded_channel();
    let err = reg.join_room(&code, ALICE, "alice", tx).unwrap_err();
    assert!(matches!(err, RoomError::AlreadyInRoom(..)));
    assert_eq!(reg.room(&code).unwrap().players().len(), 1);
}

// =========================================================================
// Turns
// =========================================================================

#[test]
fn test_authorize_turn_checks_membership_and_turn() {
    let mut reg = registry();
    let (tx, _rx) = mpsc::unbounded_channel();
    let (code, _) = reg.create_room(ALICE, "alice", 3, tx).unwrap();

    assert!(matches!(
        reg.authorize_turn(&code, ALICE),
        Err(RoomError::WaitingForOpponent(_))
    ));

    let (tx, _rx_b) = mpsc::unbounded_channel();
    reg.join_room(&code, BOB, "bob", tx).unwrap();

    assert_eq!(reg.authorize_turn(&code, ALICE).unwrap(), Role::A);
    assert!(matches!(
        reg.authorize_turn(&code, BOB),
        Err(RoomError::NotYourTurn { current: Role::A })
    ));
    assert!(matches!(
        reg.authorize_turn(&code, CAROL),
        Err(RoomError::NotInRoom(p, _)) if p == CAROL
    ));
    assert!(matches!(
        reg.authorize_turn(&RoomCode::from("ZZZZZZ"), ALICE),
        Err(RoomError::NotFound(_))
    ));
}

#[test]
fn test_roll_dice_broadcasts_update() {
    let mut reg = registry();
    let (code, mut rx_a, mut rx_b) = two_player_room(&mut reg, 5);

    let value = reg.roll_dice(&code).unwrap();
    assert!((1..=5).contains(&value));

    let game = reg.room(&code).unwrap().game().clone();
    assert_eq!(game.dice_value(), Some(value));
    assert_eq!(game.moves_left(), value);
    assert!(!game.waiting_for_roll());

    let expected = ServerEvent::GameUpdate {
        room_id: code.clone(),
        game,
        events: Vec::new(),
    };
    assert_eq!(drain(&mut rx_a), vec![expected.clone()]);
    assert_eq!(drain(&mut rx_b), vec![expected]);
}

#[test]
fn test_second_roll_is_rejected_without_broadcast() {
    let mut reg = registry();
    let (code, mut rx_a, _rx_b) = two_player_room(&mut reg, 3);
    reg.roll_dice(&code).unwrap();
    drain(&mut rx_a);

    let before = reg.snapshot(&code).unwrap();
    let err = reg.roll_dice(&code).unwrap_err();

    assert!(matches!(
        err,
        RoomError::RollRejected(RollRejection::AlreadyRolled)
    ));
    assert!(err.error_code().is_none());
    assert_eq!(reg.snapshot(&code).unwrap(), before);
    assert!(drain(&mut rx_a).is_empty());
}

#[test]
fn test_roll_dice_unknown_room() {
    let mut reg = registry();
    assert!(matches!(
        reg.roll_dice(&RoomCode::from("ZZZZZZ")),
        Err(RoomError::NotFound(_))
    ));
}

#[test]
fn test_move_before_roll_is_silent() {
    let mut reg = registry();
    let (code, mut rx_a, mut rx_b) = two_player_room(&mut reg, 3);

    let err = reg.make_move(&code, Line::horizontal(0, 0)).unwrap_err();
    assert!(matches!(err, RoomError::MoveRejected(MoveRejection::MustRoll)));
    assert!(err.error_code().is_none());
    assert!(drain(&mut rx_a).is_empty());
    assert!(drain(&mut rx_b).is_empty());
}

#[test]
fn test_out_of_bounds_move_is_rejected() {
    let mut reg = registry();
    let (code, _rx_a, _rx_b) = two_player_room(&mut reg, 2);
    reg.roll_dice(&code).unwrap();

    let before = reg.snapshot(&code).unwrap();
    let err = reg.make_move(&code, Line::vertical(2, 0)).unwrap_err();
    assert!(matches!(
        err,
        RoomError::MoveRejected(MoveRejection::OutOfBounds)
    ));
    assert_eq!(reg.snapshot(&code).unwrap(), before);
}

#[test]
fn test_one_by_one_game_to_completion() {
    let mut reg = registry();
    let (code, mut rx_a, mut rx_b) = two_player_room(&mut reg, 1);

    // A 1x1 die always shows 1, so the seats alternate one line at a time.
    let lines = [
        (ALICE, Line::horizontal(0, 0)),
        (BOB, Line::horizontal(1, 0)),
        (ALICE, Line::vertical(0, 0)),
        (BOB, Line::vertical(0, 1)),
    ];
    let mut last_events = Vec::new();
    for (player, line) in lines {
        reg.authorize_turn(&code, player).unwrap();
        assert_eq!(reg.roll_dice(&code).unwrap(), 1);
        last_events = reg.make_move(&code, line).unwrap();
    }

    assert!(last_events.contains(&GameEvent::GameWon {
        winner: Winner::B
    }));
    let room = reg.room(&code).unwrap();
    assert_eq!(room.phase(), RoomPhase::Finished);
    assert_eq!(room.game().scores().get(Role::B), 1);
    assert_eq!(room.game().moves_left(), 0);

    // Four rolls and four moves reached both players.
    assert_eq!(drain(&mut rx_a).len(), 8);
    assert_eq!(drain(&mut rx_b).len(), 8);

    // Finished games still authorize, and the engine refuses.
    assert!(reg.authorize_turn(&code, ALICE).is_ok());
    assert!(matches!(
        reg.roll_dice(&code),
        Err(RoomError::RollRejected(RollRejection::GameOver))
    ));
}

// =========================================================================
// Departure and eviction
// =========================================================================

#[test]
fn test_leave_notifies_remaining_player() {
    let mut reg = registry();
    let (code, _rx_a, mut rx_b) = two_player_room(&mut reg, 3);

    assert_eq!(reg.leave(ALICE), Some(code.clone()));

    assert_eq!(
        drain(&mut rx_b),
        vec![ServerEvent::PlayerLeft {
            room_id: code.clone(),
            role: Role::A,
            name: "alice".into(),
        }]
    );
    let snapshot = reg.snapshot(&code).unwrap();
    assert_eq!(snapshot.players.len(), 2);
    assert!(!snapshot.players[0].connected);
    assert!(snapshot.players[1].connected);
    assert!(reg.player_room(ALICE).is_none());

    // The empty seat is still taken.
    let (tx, _rx_c) = mpsc::unbounded_channel();
    assert!(matches!(
        reg.join_room(&code, CAROL, "carol", tx),
        Err(RoomError::RoomFull(_))
    ));
}

#[test]
fn test_last_leave_removes_room() {
    let mut reg = registry();
    let (code, _rx_a, _rx_b) = two_player_room(&mut reg, 3);

    reg.leave(ALICE);
    reg.leave(BOB);

    assert_eq!(reg.room_count(), 0);
    assert!(reg.room(&code).is_none());
    assert!(reg.leave(BOB).is_none());
}

#[test]
fn test_owner_leaving_waiting_room_removes_it() {
    let mut reg = registry();
    let (tx, _rx) = mpsc::unbounded_channel();
    let (code, _) = reg.create_room(ALICE, "alice", 3, tx).unwrap();

    reg.leave(ALICE);

    let (tx, _rx_b) = mpsc::unbounded_channel();
    assert!(matches!(
        reg.join_room(&code, BOB, "bob", tx),
        Err(RoomError::NotFound(_))
    ));
}

#[test]
fn test_sweep_keeps_fresh_rooms() {
    let mut reg = registry();
    let (_code, _rx_a, _rx_b) = two_player_room(&mut reg, 3);
    assert_eq!(reg.sweep(Instant::now()), 0);
    assert_eq!(reg.room_count(), 1);
}

#[test]
fn test_sweep_evicts_finished_room_after_ttl() {
    let mut reg = registry();
    let (code, mut rx_a, mut rx_b) = two_player_room(&mut reg, 1);
    for line in [
        Line::horizontal(0, 0),
        Line::horizontal(1, 0),
        Line::vertical(0, 0),
        Line::vertical(0, 1),
    ] {
        reg.roll_dice(&code).unwrap();
        reg.make_move(&code, line).unwrap();
    }
    drain(&mut rx_a);
    drain(&mut rx_b);

    let ttl = reg.config().finished_ttl;
    assert_eq!(reg.sweep(Instant::now()), 0);
    assert_eq!(reg.sweep(Instant::now() + ttl + Duration::from_secs(1)), 1);

    assert_eq!(reg.room_count(), 0);
    assert!(reg.player_room(ALICE).is_none());
    assert!(reg.player_room(BOB).is_none());
    for inbox in [&mut rx_a, &mut rx_b] {
        assert!(matches!(
            drain(inbox).as_slice(),
            [ServerEvent::RoomClosed { room_id, .. }] if *room_id == code
        ));
    }
}

#[test]
fn test_sweep_evicts_idle_room() {
    let config = RegistryConfig {
        idle_ttl: Duration::from_secs(60),
        ..RegistryConfig::default()
    };
    let mut reg = RoomRegistry::with_rng(config, StdRng::seed_from_u64(1));
    let (tx, mut rx) = mpsc::unbounded_channel();
    reg.create_room(ALICE, "alice", 3, tx).unwrap();

    assert_eq!(reg.sweep(Instant::now() + Duration::from_secs(61)), 1);
    assert_eq!(reg.room_count(), 0);

    // A fresh room for the same player is allowed again.
    let (tx, _rx2) = mpsc::unbounded_channel();
    assert!(reg.create_room(ALICE, "alice", 3, tx).is_ok());
    assert!(matches!(
        drain(&mut rx).as_slice(),
        [
            ServerEvent::RoomCreated { .. },
            ServerEvent::RoomClosed { reason, .. },
        ] if reason == "idle timeout"
    ));
}
