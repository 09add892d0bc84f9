//! Board and zone invariants checked after every step of seeded random games

use grid_tactics::config::RulesConfig;
use grid_tactics::core::{CardId, StatusKind};
use grid_tactics::game::status_engine::recalculate_board;
use grid_tactics::game::{GameLoop, GameState, PlayerController, RandomController, VerbosityLevel};
use grid_tactics::loader::{CardDatabase, GameInitializer, Seat};
use std::collections::HashSet;
use std::sync::Arc;

const STEPS_PER_GAME: u32 = 3_000;

fn new_game(players: usize, seed: u64) -> GameState {
    let content = CardDatabase::from_json_str(include_str!("../cards/starter.json")).unwrap();
    let deck = content.get_deck("Balanced").unwrap().clone();
    let seats: Vec<Seat> = (1..=players)
        .map(|i| Seat::new(format!("P{i}"), deck.clone()))
        .collect();
    GameInitializer::new(Arc::new(content), RulesConfig::default())
        .init_game(&seats, seed)
        .unwrap()
}

fn controllers(game: &GameState, seed: u64) -> Vec<Box<dyn PlayerController>> {
    game.player_ids()
        .into_iter()
        .map(|id| {
            Box::new(RandomController::with_seed(id, seed * 31 + id.as_u32() as u64)) as Box<dyn PlayerController>
        })
        .collect()
}

/// Play a seeded game, calling `check` on the state after every applied step
fn play_checked(players: usize, seed: u64, mut check: impl FnMut(&GameState)) {
    let mut game = new_game(players, seed);
    let mut controllers = controllers(&game, seed);
    check(&game);

    let mut game_loop = GameLoop::new(&mut game).with_verbosity(VerbosityLevel::Silent);
    for _ in 0..STEPS_PER_GAME {
        if game_loop.game.is_game_over() || !game_loop.step(&mut controllers).unwrap() {
            break;
        }
        check(game_loop.game);
    }
}

#[test]
fn test_cards_are_never_duplicated_or_lost() {
    for seed in [1, 2, 3] {
        let mut dealt: Option<HashSet<CardId>> = None;
        play_checked(2, seed, |game| {
            let ids = game.all_card_ids();
            let unique: HashSet<CardId> = ids.iter().copied().collect();
            assert_eq!(unique.len(), ids.len(), "seed {seed}: a card is in two places");

            let initial = dealt.get_or_insert_with(|| unique.clone());
            assert!(initial.is_subset(&unique), "seed {seed}: a card vanished");
        });
    }
}

#[test]
fn test_recalculation_is_idempotent() {
    for seed in [4, 5] {
        play_checked(3, seed, |game| {
            let mut once = game.board.clone();
            recalculate_board(&mut once, &game.players);
            let mut twice = once.clone();
            recalculate_board(&mut twice, &game.players);
            assert_eq!(once, twice);
        });
    }
}

#[test]
fn test_support_is_symmetric() {
    for seed in [6, 7] {
        play_checked(2, seed, |game| {
            for (coord, card) in game.board.cards() {
                let allies = game
                    .board
                    .neighbors(coord)
                    .into_iter()
                    .filter_map(|n| game.board.get(n))
                    .filter(|n| n.owner == card.owner && !n.is_stunned())
                    .count();
                let expected = allies > 0 && !card.is_stunned();
                assert_eq!(
                    card.has_status(StatusKind::Support),
                    expected,
                    "seed {seed}: support mismatch at {coord}"
                );
            }
        });
    }
}

#[test]
fn test_one_last_played_card_per_player() {
    play_checked(4, 8, |game| {
        for player in &game.players {
            let marked = game
                .board
                .cards()
                .filter(|(_, c)| c.owner == player.id && c.has_status(StatusKind::LastPlayed))
                .count();
            assert!(marked <= 1, "player {} has {marked} last played cards", player.id);
        }
    });
}
