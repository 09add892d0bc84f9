//! Card database for looking up content definitions
//!
//! Provides lookup of card, token and counter definitions by id. Content is
//! loaded from a JSON document:
//!
//! ```json
//! { "cards": [ ... ], "counters": [ ... ], "decks": [ ... ] }
//! ```

use crate::core::{DefinitionId, StatusKind};
use crate::loader::card::{CardDefinition, CounterDefinition};
use crate::loader::deck::DeckList;
use crate::{EngineError, Result};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;

/// On-disk content document
#[derive(Debug, Deserialize)]
struct ContentFile {
    #[serde(default)]
    cards: Vec<CardDefinition>,
    #[serde(default)]
    counters: Vec<CounterDefinition>,
    #[serde(default)]
    decks: Vec<DeckList>,
}

/// Database of content definitions
#[derive(Debug, Clone, Default)]
pub struct CardDatabase {
    cards: FxHashMap<String, CardDefinition>,
    counters: FxHashMap<StatusKind, CounterDefinition>,
    decks: FxHashMap<String, DeckList>,
}

impl CardDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        CardDatabase::default()
    }

    /// Parse a content document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ContentFile = serde_json::from_str(json)?;
        let mut db = CardDatabase::new();
        for card in file.cards {
            db.add_card(card);
        }
        for counter in file.counters {
            db.add_counter(counter);
        }
        for deck in file.decks {
            db.add_deck(deck);
        }
        db.validate()?;
        Ok(db)
    }

    /// Load a content document from disk
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EngineError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Content file not found: {path:?}"),
            )));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check that every deck entry references a known definition
    pub fn validate(&self) -> Result<()> {
        for deck in self.decks.values() {
            for entry in &deck.cards {
                if !self.contains(&entry.card) {
                    return Err(EngineError::InvalidContent(format!(
                        "deck '{}' references unknown card '{}'",
                        deck.name, entry.card
                    )));
                }
            }
        }
        Ok(())
    }

    /// Add a single card definition to the database
    pub fn add_card(&mut self, card_def: CardDefinition) {
        self.cards.insert(card_def.id.key(), card_def);
    }

    pub fn add_counter(&mut self, counter: CounterDefinition) {
        self.counters.insert(counter.status, counter);
    }

    pub fn add_deck(&mut self, deck: DeckList) {
        self.decks.insert(deck.name.to_lowercase(), deck);
    }

    /// Look up a card by id (case-insensitive)
    pub fn get_card(&self, id: &DefinitionId) -> Option<&CardDefinition> {
        self.cards.get(&id.key())
    }

    /// Look up a card, failing with a content error
    pub fn require_card(&self, id: &DefinitionId) -> Result<&CardDefinition> {
        self.get_card(id)
            .ok_or_else(|| EngineError::InvalidContent(format!("unknown card '{id}'")))
    }

    pub fn get_counter(&self, status: StatusKind) -> Option<&CounterDefinition> {
        self.counters.get(&status)
    }

    /// Registered counter statuses in sorted order
    pub fn counter_statuses(&self) -> Vec<StatusKind> {
        let mut statuses: Vec<StatusKind> = self.counters.keys().copied().collect();
        statuses.sort_unstable();
        statuses
    }

    pub fn get_deck(&self, name: &str) -> Option<&DeckList> {
        self.decks.get(&name.to_lowercase())
    }

    /// Deck names in sorted order
    pub fn deck_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.decks.values().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Check if a card exists in the database
    pub fn contains(&self, id: &DefinitionId) -> bool {
        self.cards.contains_key(&id.key())
    }

    /// Total number of cards in database
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if database is empty
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CardType;

    #[test]
    fn test_empty_database() {
        let db = CardDatabase::new();
        assert_eq!(db.len(), 0);
        assert!(db.is_empty());
        assert!(db.get_card(&DefinitionId::new("hero")).is_none());
        assert!(db.require_card(&DefinitionId::new("hero")).is_err());
    }

    #[test]
    fn test_manual_add() {
        let mut db = CardDatabase::new();
        db.add_card(CardDefinition::new("Unit_Guard", "Guard", 3).with_type(CardType::Unit));

        assert_eq!(db.len(), 1);
        assert!(db.contains(&DefinitionId::new("unit_guard"))); // Case insensitive
        let card = db.get_card(&DefinitionId::new("UNIT_GUARD")).unwrap();
        assert_eq!(card.name.as_str(), "Guard");
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "cards": [ { "id": "unit_guard", "name": "Guard", "power": 3, "types": ["Unit"] } ],
            "counters": [ { "status": "Stun", "label": "Stun" } ],
            "decks": [ { "name": "Guards", "cards": [ { "card": "unit_guard", "count": 4 } ] } ]
        }"#;
        let db = CardDatabase::from_json_str(json).unwrap();
        assert_eq!(db.len(), 1);
        assert!(db.get_counter(StatusKind::Stun).is_some());
        assert!(db.get_counter(StatusKind::Aim).is_none());
        assert_eq!(db.get_deck("guards").unwrap().total_cards(), 4);
        assert_eq!(db.deck_names(), vec!["Guards"]);
    }

    #[test]
    fn test_deck_with_unknown_card_is_rejected() {
        let json = r#"{
            "cards": [],
            "decks": [ { "name": "Broken", "cards": [ { "card": "missing", "count": 1 } ] } ]
        }"#;
        assert!(matches!(
            CardDatabase::from_json_str(json),
            Err(EngineError::InvalidContent(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = CardDatabase::load_from_file(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(EngineError::IoError(_))));
    }
}
