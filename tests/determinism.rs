//! Same seed, same game
//!
//! Runs seeded random games twice and compares the serialized end state.

use grid_tactics::config::RulesConfig;
use grid_tactics::game::{GameLoop, GameResult, GameState, PlayerController, RandomController, VerbosityLevel};
use grid_tactics::loader::{CardDatabase, GameInitializer, Seat};
use similar_asserts::assert_eq;
use std::sync::Arc;

fn run(seed: u64, players: usize) -> (GameResult, String) {
    let content = CardDatabase::from_json_str(include_str!("../cards/starter.json")).unwrap();
    let deck = content.get_deck("balanced").unwrap().clone();
    let seats: Vec<Seat> = (1..=players)
        .map(|i| Seat::new(format!("Player {i}"), deck.clone()))
        .collect();
    let mut game: GameState = GameInitializer::new(Arc::new(content), RulesConfig::default())
        .init_game(&seats, seed)
        .unwrap();

    let mut controllers: Vec<Box<dyn PlayerController>> = game
        .player_ids()
        .into_iter()
        .map(|id| Box::new(RandomController::with_seed(id, seed ^ id.as_u32() as u64)) as Box<dyn PlayerController>)
        .collect();
    let result = GameLoop::new(&mut game)
        .with_max_steps(5_000)
        .with_verbosity(VerbosityLevel::Silent)
        .run_game(&mut controllers)
        .unwrap();
    (result, serde_json::to_string_pretty(&game).unwrap())
}

#[test]
fn test_same_seed_same_snapshot() {
    for (seed, players) in [(42, 2), (7, 3), (99, 4)] {
        let (result1, snapshot1) = run(seed, players);
        let (result2, snapshot2) = run(seed, players);
        assert_eq!(result1, result2);
        assert_eq!(snapshot1, snapshot2);
    }
}

#[test]
fn test_different_seeds_diverge() {
    let (_, a) = run(1, 2);
    let (_, b) = run(2, 2);
    assert!(a != b);
}

#[test]
fn test_snapshot_restores() {
    let (_, snapshot) = run(5, 2);
    let restored: GameState = serde_json::from_str(&snapshot).unwrap();
    assert_eq!(serde_json::to_string_pretty(&restored).unwrap(), snapshot);
}

#[test]
fn test_game_log_is_captured_in_memory() {
    let content = CardDatabase::from_json_str(include_str!("../cards/starter.json")).unwrap();
    let deck = content.get_deck("Vanguard").unwrap().clone();
    let seats = vec![Seat::new("A", deck.clone()), Seat::new("B", deck)];
    let mut game = GameInitializer::new(Arc::new(content), RulesConfig::default())
        .init_game(&seats, 3)
        .unwrap();

    let mut controllers: Vec<Box<dyn PlayerController>> = game
        .player_ids()
        .into_iter()
        .map(|id| Box::new(RandomController::with_seed(id, id.as_u32() as u64)) as Box<dyn PlayerController>)
        .collect();
    GameLoop::new(&mut game)
        .with_max_steps(500)
        .with_verbosity(VerbosityLevel::Normal)
        .run_game(&mut controllers)
        .unwrap();

    let logs = game.logger.logs();
    assert!(logs.iter().any(|entry| entry.category == Some("turn")));
    assert!(logs.iter().all(|entry| entry.level <= VerbosityLevel::Normal));
}
