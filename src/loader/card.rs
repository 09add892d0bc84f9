//! Static card content
//!
//! Definitions are immutable lookup data: the engine instantiates cards from
//! them and reads their abilities and passives, but never mutates them.

use crate::core::{Card, CardId, CardName, CardType, DefinitionId, PlayerId, StatusKind};
use crate::game::abilities::{AbilityAction, AbilityTrigger};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Always-on card rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Passive {
    /// Owner's line scoring also counts opposing cards the owner tagged with Exploit
    Intercept,
    /// While supported, owner gains `bonus` when a revealed opposing card enters the board
    Spotter { bonus: i32 },
    /// Never receives Stun
    StunImmune,
    /// Gains `amount` bonus power when returned to the board from discard
    ResurrectionBoost { amount: i32 },
}

/// Ability slots by trigger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilitySet {
    pub deploy: Option<AbilityAction>,
    pub setup: Option<AbilityAction>,
    pub commit: Option<AbilityAction>,
    pub command: Option<AbilityAction>,
}

impl AbilitySet {
    pub fn get(&self, trigger: AbilityTrigger) -> Option<&AbilityAction> {
        match trigger {
            AbilityTrigger::Deploy => self.deploy.as_ref(),
            AbilityTrigger::Setup => self.setup.as_ref(),
            AbilityTrigger::Commit => self.commit.as_ref(),
            AbilityTrigger::Command => self.command.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.deploy.is_none()
            && self.setup.is_none()
            && self.commit.is_none()
            && self.command.is_none()
    }
}

/// A card definition from the content set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: DefinitionId,
    pub name: CardName,
    pub power: i32,
    #[serde(default)]
    pub types: SmallVec<[CardType; 2]>,
    #[serde(default)]
    pub abilities: AbilitySet,
    #[serde(default)]
    pub passives: Vec<Passive>,
}

impl CardDefinition {
    pub fn new(id: impl Into<DefinitionId>, name: impl Into<CardName>, power: i32) -> Self {
        CardDefinition {
            id: id.into(),
            name: name.into(),
            power,
            types: SmallVec::new(),
            abilities: AbilitySet::default(),
            passives: Vec::new(),
        }
    }

    pub fn with_type(mut self, card_type: CardType) -> Self {
        self.types.push(card_type);
        self
    }

    pub fn with_passive(mut self, passive: Passive) -> Self {
        self.passives.push(passive);
        self
    }

    pub fn with_ability(mut self, trigger: AbilityTrigger, action: AbilityAction) -> Self {
        let slot = match trigger {
            AbilityTrigger::Deploy => &mut self.abilities.deploy,
            AbilityTrigger::Setup => &mut self.abilities.setup,
            AbilityTrigger::Commit => &mut self.abilities.commit,
            AbilityTrigger::Command => &mut self.abilities.command,
        };
        *slot = Some(action);
        self
    }

    pub fn is_stun_immune(&self) -> bool {
        self.passives.contains(&Passive::StunImmune)
    }

    pub fn has_intercept(&self) -> bool {
        self.passives.contains(&Passive::Intercept)
    }

    pub fn spotter_bonus(&self) -> Option<i32> {
        self.passives.iter().find_map(|p| match p {
            Passive::Spotter { bonus } => Some(*bonus),
            _ => None,
        })
    }

    pub fn resurrection_boost(&self) -> Option<i32> {
        self.passives.iter().find_map(|p| match p {
            Passive::ResurrectionBoost { amount } => Some(*amount),
            _ => None,
        })
    }

    /// Create a fresh card instance of this definition
    pub fn instantiate(&self, id: CardId, owner: PlayerId) -> Card {
        let mut card = Card::new(id, self.name.clone(), owner, self.power);
        card.base_id = Some(self.id.clone());
        card.types = self.types.clone();
        card
    }
}

/// Counter metadata: statuses players may drag from the counter panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterDefinition {
    pub status: StatusKind,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityId;
    use crate::game::abilities::{ActionKind, AutoEffect, Count};

    #[test]
    fn test_parse_definition() {
        let json = r#"{
            "id": "hero_warden",
            "name": "Warden",
            "power": 4,
            "types": ["Hero"],
            "passives": [{ "type": "StunImmune" }, { "type": "ResurrectionBoost", "amount": 2 }],
            "abilities": {
                "commit": {
                    "kind": { "type": "GLOBAL_AUTO_APPLY",
                              "effect": { "effect": "GainScore", "amount": { "type": "Fixed", "value": 1 } } }
                }
            }
        }"#;
        let def: CardDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.power, 4);
        assert!(def.is_stun_immune());
        assert_eq!(def.resurrection_boost(), Some(2));
        assert_eq!(def.spotter_bonus(), None);
        assert!(def.abilities.get(AbilityTrigger::Commit).is_some());
        assert!(def.abilities.get(AbilityTrigger::Deploy).is_none());
    }

    #[test]
    fn test_instantiate() {
        let def = CardDefinition::new("unit_scout", "Scout", 2)
            .with_type(CardType::Unit)
            .with_ability(
                AbilityTrigger::Deploy,
                AbilityAction::new(ActionKind::GlobalAutoApply {
                    effect: AutoEffect::DrawCards {
                        count: Count::fixed(1),
                    },
                }),
            );
        let card = def.instantiate(EntityId::new(7), EntityId::new(2));

        assert_eq!(card.base_id, Some(DefinitionId::new("unit_scout")));
        assert_eq!(card.power, 2);
        assert!(card.is_type(CardType::Unit));
        assert_eq!(card.owner, EntityId::new(2));
        assert!(!def.abilities.is_empty());
    }
}
