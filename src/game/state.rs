//! Main game state structure

use crate::config::RulesConfig;
use crate::core::{Board, Card, CardId, Coord, EntityId, Player, PlayerId, PlayerName};
use crate::game::abilities::{ActiveMode, CommandContext};
use crate::game::{GameEvent, GameLogger, Phase};
use crate::loader::{CardDatabase, CardDefinition};
use crate::zones::Zone;
use crate::{EngineError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Where a card currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLocation {
    /// Owner of the zone (for the board: the card's owner)
    pub player: PlayerId,
    pub zone: Zone,
    pub coord: Option<Coord>,
}

/// Complete game state
///
/// The authoritative snapshot for one session. Every public rule operation
/// takes `&mut GameState` and leaves it fully consistent (statuses
/// recalculated) before returning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Players in ascending id order (turn order)
    pub players: Vec<Player>,

    pub board: Board,

    pub current_phase: Phase,

    /// Sub-state entered after Commit, left by resolving scoring
    pub is_scoring_step: bool,

    pub active_turn_player_id: PlayerId,

    /// Player whose turn opens each rotation
    pub starting_player_id: PlayerId,

    /// Session host; controls dummy seats
    pub host_player_id: Option<PlayerId>,

    pub current_round: u32,

    pub turn_number: u32,

    /// Round number -> players tied for the win
    pub round_winners: BTreeMap<u32, SmallVec<[PlayerId; 4]>>,

    pub game_winner: Option<PlayerId>,

    /// The single interactive ability mode, if any
    pub ability_mode: Option<ActiveMode>,

    /// Cross-step memory of the running ability
    pub context: CommandContext,

    /// Undrained presentation events
    pub events: Vec<GameEvent>,

    pub config: RulesConfig,

    /// Immutable content lookup, shared between sessions
    #[serde(skip)]
    pub content: Arc<CardDatabase>,

    /// Gameplay RNG (serializable for deterministic replay)
    pub rng: ChaCha12Rng,

    /// Card instance id allocator
    next_entity_id: u32,

    /// Centralized logger for engine events
    pub logger: GameLogger,
}

impl GameState {
    /// Create a game with one seat per name; player ids are 1..=n
    pub fn new(names: &[&str], config: RulesConfig, content: Arc<CardDatabase>) -> Self {
        let players: Vec<Player> = names
            .iter()
            .enumerate()
            .map(|(i, name)| Player::new(EntityId::new(i as u32 + 1), PlayerName::new(*name)))
            .collect();
        let first = players.first().map_or(EntityId::new(1), |p| p.id);
        let board = Board::new(config.board_size, config.active_grid_size(players.len()));
        let next_entity_id = players.len() as u32 + 1;

        GameState {
            players,
            board,
            current_phase: Phase::Setup,
            is_scoring_step: false,
            active_turn_player_id: first,
            starting_player_id: first,
            host_player_id: Some(first),
            current_round: 1,
            turn_number: 1,
            round_winners: BTreeMap::new(),
            game_winner: None,
            ability_mode: None,
            context: CommandContext::new(),
            events: Vec::new(),
            config,
            content,
            rng: ChaCha12Rng::seed_from_u64(0),
            next_entity_id,
            logger: GameLogger::new(),
        }
    }

    /// Set the RNG seed for deterministic gameplay
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = ChaCha12Rng::seed_from_u64(seed);
    }

    /// Allocate a fresh card instance id
    pub fn next_card_id(&mut self) -> CardId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    /// Size of the in-play window
    pub fn active_grid_size(&self) -> usize {
        self.board.active_size()
    }

    /// Get a player by ID
    pub fn get_player(&self, id: PlayerId) -> Result<&Player> {
        self.player(id)
            .ok_or(EngineError::EntityNotFound(id.as_u32()))
    }

    /// Get a mutable player by ID
    pub fn get_player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.player_mut(id)
            .ok_or(EngineError::EntityNotFound(id.as_u32()))
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Player ids in turn order
    pub fn player_ids(&self) -> SmallVec<[PlayerId; 4]> {
        self.players.iter().map(|p| p.id).collect()
    }

    /// Next player by ascending id, wrapping around
    pub fn next_player_after(&self, id: PlayerId) -> PlayerId {
        self.players
            .iter()
            .map(|p| p.id)
            .find(|p| *p > id)
            .or_else(|| self.players.first().map(|p| p.id))
            .unwrap_or(id)
    }

    /// Same player or same team
    pub fn is_teammate(&self, a: PlayerId, b: PlayerId) -> bool {
        if a == b {
            return true;
        }
        match (self.player(a), self.player(b)) {
            (Some(pa), Some(pb)) => pa.is_teammate_of(pb),
            _ => false,
        }
    }

    /// Different owner on a different team
    pub fn is_opponent(&self, a: PlayerId, b: PlayerId) -> bool {
        !self.is_teammate(a, b)
    }

    /// May `actor` act for `owner`? True for the owner itself, and for the
    /// session host acting for a dummy seat.
    pub fn can_control(&self, actor: PlayerId, owner: PlayerId) -> bool {
        if actor == owner {
            return true;
        }
        self.player(owner).is_some_and(|p| p.is_dummy) && self.host_player_id == Some(actor)
    }

    /// Content definition backing a card instance
    pub fn definition(&self, card: &Card) -> Option<&CardDefinition> {
        card.base_id.as_ref().and_then(|id| self.content.get_card(id))
    }

    pub fn is_stun_immune(&self, card: &Card) -> bool {
        self.definition(card).is_some_and(|d| d.is_stun_immune())
    }

    /// Draw up to `count` cards; returns how many were drawn
    pub fn draw_cards(&mut self, player_id: PlayerId, count: usize) -> usize {
        let Some(player) = self.player_mut(player_id) else {
            return 0;
        };
        let mut drawn = 0;
        for _ in 0..count {
            if player.draw().is_none() {
                break;
            }
            drawn += 1;
        }
        if drawn < count {
            log_if_verbose!(
                self.logger,
                Verbose,
                "draw",
                "player {} deck empty after {} of {} draws",
                player_id,
                drawn,
                count
            );
        }
        drawn
    }

    /// Shuffle a player's deck using the game RNG
    pub fn shuffle_deck(&mut self, player_id: PlayerId) {
        if let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) {
            player.deck.shuffle(&mut self.rng);
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain pending presentation events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Find a card by id anywhere (board first, then player zones)
    pub fn locate_card(&self, card_id: CardId) -> Option<CardLocation> {
        if let Some(coord) = self.board.find_card(card_id) {
            let owner = self.board.get(coord).map(|c| c.owner)?;
            return Some(CardLocation {
                player: owner,
                zone: Zone::Board,
                coord: Some(coord),
            });
        }
        self.players.iter().find_map(|p| {
            p.find_card(card_id).map(|zone| CardLocation {
                player: p.id,
                zone,
                coord: None,
            })
        })
    }

    /// Shared view of a card wherever it is
    pub fn card(&self, card_id: CardId) -> Option<&Card> {
        if let Some(coord) = self.board.find_card(card_id) {
            return self.board.get(coord);
        }
        self.players.iter().find_map(|p| {
            p.hand
                .get(card_id)
                .or_else(|| p.deck.get(card_id))
                .or_else(|| p.discard.get(card_id))
                .or_else(|| p.announced.as_ref().filter(|c| c.id == card_id))
        })
    }

    /// Every card id in every zone, duplicates included
    pub fn all_card_ids(&self) -> Vec<CardId> {
        let mut ids: Vec<CardId> = self.board.cards().map(|(_, c)| c.id).collect();
        for p in &self.players {
            ids.extend(p.hand.iter().map(|c| c.id));
            ids.extend(p.deck.iter().map(|c| c.id));
            ids.extend(p.discard.iter().map(|c| c.id));
            ids.extend(p.announced.iter().map(|c| c.id));
        }
        ids
    }

    /// How many zones hold `card_id` (1 for every live card)
    pub fn card_count(&self, card_id: CardId) -> usize {
        self.all_card_ids().iter().filter(|id| **id == card_id).count()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_winner.is_some()
    }
}
