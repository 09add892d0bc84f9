//! Transient events for the presentation layer
//!
//! Events ride along with the snapshot and are drained by whoever renders it.
//! They never affect rules.

use crate::core::{CardId, Coord, PlayerId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// Floating number over a cell (e.g. per-card score contribution)
    FloatingText {
        coord: Coord,
        text: String,
        player: PlayerId,
    },

    /// An ability step had nothing to act on
    NoTarget {
        player: PlayerId,
        coord: Option<Coord>,
    },

    /// A top-level ability finished; readiness should be rechecked
    AbilityComplete { player: PlayerId, card_id: CardId },

    Scored { player: PlayerId, amount: i32 },

    RoundEnded {
        round: u32,
        winners: SmallVec<[PlayerId; 4]>,
    },

    GameWon { winner: PlayerId },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityId;

    #[test]
    fn test_event_tagging() {
        let event = GameEvent::NoTarget {
            player: EntityId::new(1),
            coord: Some(Coord::new(2, 3)),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "no_target");
        assert_eq!(json["coord"]["row"], 2);
    }
}
