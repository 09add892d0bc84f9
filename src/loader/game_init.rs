//! Game initialization from decks
//!
//! Creates games from seats, deck lists and the card database

use crate::config::RulesConfig;
use crate::core::PlayerId;
use crate::game::{readiness, status_engine, GameState};
use crate::loader::{CardDatabase, DeckList};
use crate::{EngineError, Result};
use std::sync::Arc;

/// One seat at the table
#[derive(Debug, Clone)]
pub struct Seat {
    pub name: String,
    pub deck: DeckList,
    pub team_id: Option<u8>,
    /// Driven by the host instead of its own controller
    pub is_dummy: bool,
}

impl Seat {
    pub fn new(name: impl Into<String>, deck: DeckList) -> Self {
        Seat {
            name: name.into(),
            deck,
            team_id: None,
            is_dummy: false,
        }
    }

    pub fn on_team(mut self, team_id: u8) -> Self {
        self.team_id = Some(team_id);
        self
    }

    pub fn dummy(mut self) -> Self {
        self.is_dummy = true;
        self
    }
}

/// Game builder for initializing games from decks
pub struct GameInitializer {
    content: Arc<CardDatabase>,
    config: RulesConfig,
}

impl GameInitializer {
    /// Create a new game initializer with a card database
    pub fn new(content: Arc<CardDatabase>, config: RulesConfig) -> Self {
        GameInitializer { content, config }
    }

    /// Build a dealt game: decks loaded, shuffled with `seed`, opening hands drawn
    pub fn init_game(&self, seats: &[Seat], seed: u64) -> Result<GameState> {
        if !(2..=4).contains(&seats.len()) {
            return Err(EngineError::InvalidConfig(format!(
                "{} seats, expected 2 to 4",
                seats.len()
            )));
        }
        self.config.validate()?;

        let names: Vec<&str> = seats.iter().map(|s| s.name.as_str()).collect();
        let mut game = GameState::new(&names, self.config.clone(), Arc::clone(&self.content));
        game.seed_rng(seed);

        let ids = game.player_ids();
        for (seat, &player_id) in seats.iter().zip(ids.iter()) {
            let player = game.get_player_mut(player_id)?;
            player.team_id = seat.team_id;
            player.is_dummy = seat.is_dummy;
            self.load_deck_into_game(&mut game, player_id, &seat.deck)?;
        }

        let hand_size = game.config.starting_hand_size;
        for &player_id in ids.iter() {
            game.shuffle_deck(player_id);
            game.draw_cards(player_id, hand_size);
        }

        status_engine::recalculate(&mut game);
        readiness::refresh(&mut game);
        log_if_verbose!(
            game.logger,
            Normal,
            "setup",
            "game created with {} seats, seed {}",
            seats.len(),
            seed
        );
        Ok(game)
    }

    /// Load a deck into a player's deck zone
    fn load_deck_into_game(&self, game: &mut GameState, player_id: PlayerId, deck: &DeckList) -> Result<()> {
        for definition_id in deck.expand() {
            let card_id = game.next_card_id();
            let card = self.content.require_card(&definition_id)?.instantiate(card_id, player_id);
            game.get_player_mut(player_id)?.deck.add(card);
        }
        Ok(())
    }
}
