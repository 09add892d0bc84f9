//! Cross-step memory for chained abilities
//!
//! A later chain step may need "the card the previous step moved". The
//! coordinate recorded at that time can be stale by the time the step reads
//! it, so lookups verify the id at the coordinate and otherwise fall back to
//! an id search over the active grid.

use crate::core::{Board, CardId, Coord};
use serde::{Deserialize, Serialize};

/// A card remembered by id and last known position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextCard {
    pub card_id: CardId,
    pub coord: Coord,
}

impl ContextCard {
    pub fn new(card_id: CardId, coord: Coord) -> Self {
        ContextCard { card_id, coord }
    }

    /// Current position of the remembered card, if it is still on the board
    pub fn locate(&self, board: &Board) -> Option<Coord> {
        match board.get(self.coord) {
            Some(card) if card.id == self.card_id => Some(self.coord),
            _ => board.find_card(self.card_id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandContext {
    /// Card most recently moved by the running ability
    pub last_moved: Option<ContextCard>,

    /// Card most recently picked as a target
    pub last_target: Option<ContextCard>,
}

impl CommandContext {
    pub fn new() -> Self {
        CommandContext::default()
    }

    pub fn record_move(&mut self, card_id: CardId, coord: Coord) {
        self.last_moved = Some(ContextCard::new(card_id, coord));
    }

    pub fn record_target(&mut self, card_id: CardId, coord: Coord) {
        self.last_target = Some(ContextCard::new(card_id, coord));
    }

    /// The card a context-targeting step acts on: moved card first, then picked card
    pub fn focus(&self) -> Option<ContextCard> {
        self.last_moved.or(self.last_target)
    }

    /// Resolve the focus card to its current coordinate
    pub fn resolve_focus(&self, board: &Board) -> Option<(CardId, Coord)> {
        let focus = self.focus()?;
        focus.locate(board).map(|coord| (focus.card_id, coord))
    }

    pub fn clear(&mut self) {
        *self = CommandContext::default();
    }
}
