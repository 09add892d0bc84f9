//! Core game types and entities

pub mod board;
pub mod card;
pub mod entity;
pub mod player;
pub mod status;
pub mod types;

pub use board::{Board, Coord, Direction};
pub use card::{Card, CardType, Visibility};
pub use entity::{EntityId, GameEntity};
pub use player::Player;
pub use status::{Status, StatusKind, StatusList};
pub use types::{CardName, DefinitionId, PlayerName};

/// Card instance id
pub type CardId = EntityId<Card>;

/// Player id
pub type PlayerId = EntityId<Player>;
