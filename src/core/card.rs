//! Card instances

use crate::core::{CardId, CardName, DefinitionId, GameEntity, PlayerId, StatusKind, StatusList};
use crate::game::Phase;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Card type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Hero,
    Unit,
    Device,
    Command,
    Token,
}

/// Who may see a card's face while it is hidden
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    All,
    Players(SmallVec<[PlayerId; 4]>),
}

impl Visibility {
    pub fn none() -> Self {
        Visibility::Players(SmallVec::new())
    }

    pub fn is_visible_to(&self, player: PlayerId) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Players(players) => players.contains(&player),
        }
    }

    pub fn reveal_to(&mut self, player: PlayerId) {
        if let Visibility::Players(players) = self {
            if !players.contains(&player) {
                players.push(player);
            }
        }
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::none()
    }
}

/// A card instance during gameplay
///
/// Many instances can share one content definition (`base_id`). The instance
/// carries all mutable per-game state: modifiers, statuses and turn flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique ID for this card instance
    pub id: CardId,

    /// Content definition / localization key
    pub base_id: Option<DefinitionId>,

    pub name: CardName,

    /// Printed power
    pub power: i32,

    /// Temporary modifier, cleared whenever the card changes zone
    pub power_modifier: i32,

    /// Passive bonus, kept across board moves until the card returns to storage
    pub bonus_power: i32,

    pub owner: PlayerId,

    pub types: SmallVec<[CardType; 2]>,

    /// Ordered status multiset
    #[serde(default)]
    pub statuses: StatusList,

    pub is_face_down: bool,

    #[serde(default)]
    pub revealed_to: Visibility,

    // Turn-scoped flags
    pub entered_this_turn: bool,
    pub deploy_ability_consumed: bool,
    pub ability_used_in_phase: Option<Phase>,
}

impl Card {
    pub fn new(id: CardId, name: impl Into<CardName>, owner: PlayerId, power: i32) -> Self {
        Card {
            id,
            base_id: None,
            name: name.into(),
            power,
            power_modifier: 0,
            bonus_power: 0,
            owner,
            types: SmallVec::new(),
            statuses: StatusList::new(),
            is_face_down: false,
            revealed_to: Visibility::none(),
            entered_this_turn: false,
            deploy_ability_consumed: false,
            ability_used_in_phase: None,
        }
    }

    pub fn is_type(&self, card_type: CardType) -> bool {
        self.types.contains(&card_type)
    }

    pub fn is_hero(&self) -> bool {
        self.is_type(CardType::Hero)
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.statuses.has(kind)
    }

    pub fn is_stunned(&self) -> bool {
        self.has_status(StatusKind::Stun)
    }

    /// Revealed either by status or by public visibility
    pub fn is_revealed(&self) -> bool {
        self.has_status(StatusKind::Revealed) || self.revealed_to == Visibility::All
    }

    /// Power used for scoring (never negative)
    pub fn effective_power(&self) -> i32 {
        (self.power + self.power_modifier + self.bonus_power).max(0)
    }

    /// Reset applied when the card enters hand, deck or discard
    pub fn reset_for_storage(&mut self) {
        self.statuses.retain(|s| s.kind == StatusKind::Revealed);
        self.is_face_down = false;
        self.power_modifier = 0;
        self.bonus_power = 0;
        self.clear_turn_flags();
    }

    pub fn clear_turn_flags(&mut self) {
        self.entered_this_turn = false;
        self.deploy_ability_consumed = false;
        self.ability_used_in_phase = None;
    }
}

impl GameEntity<Card> for Card {
    fn id(&self) -> CardId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityId;

    #[test]
    fn test_card_creation() {
        let owner = EntityId::new(1);
        let card = Card::new(EntityId::new(10), "Vanguard", owner, 3);

        assert_eq!(card.owner, owner);
        assert_eq!(card.name.as_str(), "Vanguard");
        assert_eq!(card.effective_power(), 3);
        assert!(!card.is_stunned());
        assert!(!card.is_revealed());
    }

    #[test]
    fn test_effective_power_clamps_at_zero() {
        let mut card = Card::new(EntityId::new(1), "Weak", EntityId::new(1), 2);
        card.power_modifier = -5;
        assert_eq!(card.effective_power(), 0);

        card.power_modifier = -1;
        card.bonus_power = 3;
        assert_eq!(card.effective_power(), 4);
    }

    #[test]
    fn test_reset_for_storage_keeps_revealed() {
        let p1 = EntityId::new(1);
        let p2 = EntityId::new(2);
        let mut card = Card::new(EntityId::new(1), "Spy", p1, 2);
        card.statuses.push(StatusKind::Stun, p2);
        card.statuses.push(StatusKind::Revealed, p2);
        card.statuses.push(StatusKind::Support, p1);
        card.is_face_down = true;
        card.power_modifier = 2;
        card.bonus_power = 1;
        card.entered_this_turn = true;
        card.ability_used_in_phase = Some(Phase::Main);

        card.reset_for_storage();

        assert_eq!(card.statuses.len(), 1);
        assert!(card.has_status(StatusKind::Revealed));
        assert!(!card.is_face_down);
        assert_eq!(card.power_modifier, 0);
        assert_eq!(card.bonus_power, 0);
        assert!(!card.entered_this_turn);
        assert_eq!(card.ability_used_in_phase, None);
    }

    #[test]
    fn test_visibility() {
        let p1 = EntityId::new(1);
        let p2 = EntityId::new(2);
        let mut vis = Visibility::none();
        assert!(!vis.is_visible_to(p1));
        vis.reveal_to(p1);
        vis.reveal_to(p1);
        assert_eq!(vis, Visibility::Players(smallvec::smallvec![p1]));
        assert!(!vis.is_visible_to(p2));
        assert!(Visibility::All.is_visible_to(p2));
    }
}
