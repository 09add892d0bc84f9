//! Player representation

use crate::core::{Card, CardId, GameEntity, PlayerId, PlayerName};
use crate::zones::{CardZone, Zone};
use serde::{Deserialize, Serialize};

/// Represents a player in the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique ID for this player (turn order is ascending id)
    pub id: PlayerId,

    /// Player name
    pub name: PlayerName,

    /// Round score. Card contributions are clamped at zero, the total is not.
    pub score: i32,

    pub hand: CardZone,
    pub deck: CardZone,
    pub discard: CardZone,

    /// Announced slot (0 or 1 card)
    pub announced: Option<Card>,

    pub team_id: Option<u8>,

    /// Card ids this player put onto the board, oldest first
    ///
    /// Ids are removed when the card leaves the board, so the last entry
    /// still on the board is the LastPlayed card.
    #[serde(default)]
    pub board_history: Vec<CardId>,

    /// Dummy seat, controlled by the session host
    pub is_dummy: bool,

    pub is_disconnected: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<PlayerName>) -> Self {
        Player {
            id,
            name: name.into(),
            score: 0,
            hand: CardZone::new(Zone::Hand, id),
            deck: CardZone::new(Zone::Deck, id),
            discard: CardZone::new(Zone::Discard, id),
            announced: None,
            team_id: None,
            board_history: Vec::new(),
            is_dummy: false,
            is_disconnected: false,
        }
    }

    pub fn add_score(&mut self, amount: i32) {
        self.score += amount;
    }

    /// Same team (a player is always its own teammate)
    pub fn is_teammate_of(&self, other: &Player) -> bool {
        self.id == other.id || (self.team_id.is_some() && self.team_id == other.team_id)
    }

    pub fn zone(&self, zone: Zone) -> Option<&CardZone> {
        match zone {
            Zone::Hand => Some(&self.hand),
            Zone::Deck => Some(&self.deck),
            Zone::Discard => Some(&self.discard),
            Zone::Board | Zone::Announced => None,
        }
    }

    pub fn zone_mut(&mut self, zone: Zone) -> Option<&mut CardZone> {
        match zone {
            Zone::Hand => Some(&mut self.hand),
            Zone::Deck => Some(&mut self.deck),
            Zone::Discard => Some(&mut self.discard),
            Zone::Board | Zone::Announced => None,
        }
    }

    /// Which of this player's own zones holds `card_id`, if any
    pub fn find_card(&self, card_id: CardId) -> Option<Zone> {
        if self.hand.contains(card_id) {
            Some(Zone::Hand)
        } else if self.deck.contains(card_id) {
            Some(Zone::Deck)
        } else if self.discard.contains(card_id) {
            Some(Zone::Discard)
        } else if self.announced.as_ref().is_some_and(|c| c.id == card_id) {
            Some(Zone::Announced)
        } else {
            None
        }
    }

    /// Move the top deck card to hand
    pub fn draw(&mut self) -> Option<CardId> {
        let mut card = self.deck.draw_top()?;
        card.reset_for_storage();
        let id = card.id;
        self.hand.add(card);
        Some(id)
    }

    /// Forget a card that left the board
    pub fn forget_played(&mut self, card_id: CardId) {
        self.board_history.retain(|id| *id != card_id);
    }

    pub fn record_played(&mut self, card_id: CardId) {
        self.forget_played(card_id);
        self.board_history.push(card_id);
    }
}

impl GameEntity<Player> for Player {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}
