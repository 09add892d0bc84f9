//! Content loaders
//!
//! Card, counter and deck definitions are read from JSON content files.

pub mod card;
pub mod database;
pub mod deck;
pub mod game_init;

pub use card::{AbilitySet, CardDefinition, CounterDefinition, Passive};
pub use database::CardDatabase;
pub use deck::{DeckEntry, DeckList, DeckLoader};
pub use game_init::{GameInitializer, Seat};
