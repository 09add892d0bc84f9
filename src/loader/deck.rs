//! Deck lists

use crate::core::DefinitionId;
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Deck loader for standalone JSON deck files
pub struct DeckLoader;

impl DeckLoader {
    /// Load a deck from a JSON file
    pub fn load_from_file(path: &Path) -> Result<DeckList> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a deck from its JSON text
    pub fn parse(content: &str) -> Result<DeckList> {
        let deck: DeckList = serde_json::from_str(content)?;
        if deck.total_cards() == 0 {
            return Err(EngineError::InvalidContent(format!(
                "deck '{}' is empty",
                deck.name
            )));
        }
        Ok(deck)
    }
}

/// Represents a deck entry (definition id and count)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub card: DefinitionId,
    pub count: u32,
}

/// Represents a complete deck list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckList {
    pub name: String,
    pub cards: Vec<DeckEntry>,
}

impl DeckList {
    /// Total cards in the deck
    pub fn total_cards(&self) -> usize {
        self.cards.iter().map(|e| e.count as usize).sum()
    }

    /// One definition id per physical card, in list order
    pub fn expand(&self) -> Vec<DefinitionId> {
        self.cards
            .iter()
            .flat_map(|e| std::iter::repeat(e.card.clone()).take(e.count as usize))
            .collect()
    }
}
