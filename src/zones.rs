//! Card zones (Hand, Deck, Discard, Board, Announced)

use crate::core::{Card, CardId, PlayerId};
use serde::{Deserialize, Serialize};

/// Different zones where cards can exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Hand,
    Deck,
    Discard,
    Board,
    Announced,
}

impl Zone {
    /// Storage zones strip a card back to its printed state on entry
    pub fn is_storage(&self) -> bool {
        matches!(self, Zone::Hand | Zone::Deck | Zone::Discard)
    }
}

/// An ordered per-player zone holding card instances
///
/// For the deck, the end of the vector is the top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardZone {
    /// Zone type
    pub zone_type: Zone,

    /// Owner of this zone (each player has their own zones)
    pub owner: PlayerId,

    /// Cards in this zone
    pub cards: Vec<Card>,
}

impl CardZone {
    pub fn new(zone_type: Zone, owner: PlayerId) -> Self {
        CardZone {
            zone_type,
            owner,
            cards: Vec::new(),
        }
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Insert at a position, clamped to the zone length
    pub fn insert(&mut self, index: usize, card: Card) {
        let index = index.min(self.cards.len());
        self.cards.insert(index, card);
    }

    pub fn remove(&mut self, card_id: CardId) -> Option<Card> {
        // Keep order stable: deck order and hand order are visible to players.
        let pos = self.position(card_id)?;
        Some(self.cards.remove(pos))
    }

    pub fn position(&self, card_id: CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id == card_id)
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.position(card_id).is_some()
    }

    pub fn get(&self, card_id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn get_mut(&mut self, card_id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Draw from top (for Deck)
    pub fn draw_top(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Look at top card without removing it
    pub fn peek_top(&self) -> Option<&Card> {
        self.cards.last()
    }

    /// Add to bottom (for Deck)
    pub fn add_to_bottom(&mut self, card: Card) {
        self.cards.insert(0, card);
    }

    /// Shuffle the zone (for Deck)
    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }
}
