//! Whole-game playthroughs checking the rules hold at every step.

use dicebox_game::{
    BoardSize, GameEvent, GameState, Line, MoveRejection, Role, Winner,
};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

fn all_lines(n: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    for row in 0..=n {
        for col in 0..n {
            lines.push(Line::horizontal(row, col));
        }
    }
    for row in 0..n {
        for col in 0..=n {
            lines.push(Line::vertical(row, col));
        }
    }
    lines
}

fn assert_invariants(g: &GameState) {
    assert_eq!(
        g.scores().total() as usize,
        g.claimed_count(),
        "scores must match owned squares"
    );
    if !g.is_finished() {
        assert!(
            g.waiting_for_roll() != (g.moves_left() > 0),
            "exactly one of must-roll / has-moves during a turn"
        );
    } else {
        assert_eq!(g.moves_left(), 0);
    }
}

/// Plays random legal moves until the board fills, checking invariants.
fn play_out(n: usize, seed: u64) -> GameState {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut g = GameState::new(BoardSize::new(n).unwrap());
    let lines = all_lines(n);
    assert_eq!(lines.len(), 2 * n * (n + 1));

    let mut steps = 0;
    while !g.is_finished() {
        steps += 1;
        assert!(steps < 10_000, "game did not terminate");

        if g.waiting_for_roll() {
            let value = g.roll_dice(&mut rng).unwrap();
            assert!((1..=n as u32).contains(&value));
            assert_invariants(&g);
            continue;
        }

        let open: Vec<Line> = lines
            .iter()
            .copied()
            .filter(|l| !g.line_drawn(*l))
            .collect();
        let line = *open.choose(&mut rng).unwrap();
        let player = g.current_player();
        let score_before = g.scores().get(player);
        let moves_before = g.moves_left();

        let events = g.make_move(line).unwrap();

        let claimed = events
            .iter()
            .filter(|e| matches!(e, GameEvent::SquareClaimed { .. }))
            .count() as u32;
        assert!(claimed <= 2);
        assert_eq!(g.scores().get(player), score_before + claimed);
        assert!(g.line_drawn(line));
        if !g.is_finished() {
            assert_eq!(g.moves_left(), moves_before - 1);
        }
        assert_invariants(&g);
    }
    g
}

#[test]
fn test_random_games_hold_invariants() {
    for n in 1..=5 {
        for seed in 0..20 {
            let g = play_out(n, seed);
            assert_eq!(g.claimed_count(), n * n);
            let scores = g.scores();
            let expected = match scores.a.cmp(&scores.b) {
                std::cmp::Ordering::Greater => Winner::A,
                std::cmp::Ordering::Less => Winner::B,
                std::cmp::Ordering::Equal => Winner::Draw,
            };
            assert_eq!(g.winner(), Some(expected));
        }
    }
}

#[test]
fn test_every_line_drawn_at_game_end() {
    let g = play_out(3, 7);
    assert!(g.horizontal_lines().iter().flatten().all(|d| *d));
    assert!(g.vertical_lines().iter().flatten().all(|d| *d));
}

#[test]
fn test_no_move_accepted_after_game_end() {
    let mut g = play_out(2, 3);
    for line in all_lines(2) {
        assert_eq!(g.make_move(line), Err(MoveRejection::GameOver));
    }
}

#[test]
fn test_one_by_one_board_walkthrough() {
    // A 1x1 board always rolls 1, so turns strictly alternate.
    let mut rng = StdRng::seed_from_u64(0);
    let mut g = GameState::new(BoardSize::new(1).unwrap());

    assert_eq!(g.roll_dice(&mut rng), Ok(1));
    assert_eq!(g.moves_left(), 1);
    let events = g.make_move(Line::horizontal(0, 0)).unwrap();
    assert_eq!(events, vec![GameEvent::TurnChanged { to: Role::B }]);
    assert_eq!(g.moves_left(), 0);
    assert!(g.waiting_for_roll());

    for (line, next) in [
        (Line::horizontal(1, 0), Role::A),
        (Line::vertical(0, 0), Role::B),
    ] {
        g.roll_dice(&mut rng).unwrap();
        let events = g.make_move(line).unwrap();
        assert_eq!(events, vec![GameEvent::TurnChanged { to: next }]);
        assert_eq!(g.claimed_count(), 0);
    }

    g.roll_dice(&mut rng).unwrap();
    assert_eq!(g.current_player(), Role::B);
    g.make_move(Line::vertical(0, 1)).unwrap();
    assert_eq!(g.winner(), Some(Winner::B));
    assert_eq!(g.scores().b, 1);
    assert_eq!(g.moves_left(), 0);
}
