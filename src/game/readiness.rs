//! Readiness markers
//!
//! ReadyDeploy / ReadySetup / ReadyCommit tell the presentation layer which
//! board cards have an ability that could fire right now. They are pure
//! bookkeeping: rebuilt from scratch on each refresh, attributed to the
//! card's owner, and never consulted by the rules themselves.

use crate::core::{Coord, StatusKind};
use crate::game::abilities::{check_activation, AbilityTrigger};
use crate::game::GameState;

const MARKERS: [(AbilityTrigger, StatusKind); 3] = [
    (AbilityTrigger::Deploy, StatusKind::ReadyDeploy),
    (AbilityTrigger::Setup, StatusKind::ReadySetup),
    (AbilityTrigger::Commit, StatusKind::ReadyCommit),
];

/// Rebuild readiness markers for every board card
pub fn refresh(state: &mut GameState) {
    let view: &GameState = state;
    let marks: Vec<(Coord, StatusKind)> = view
        .board
        .occupied()
        .into_iter()
        .flat_map(|coord| {
            MARKERS
                .iter()
                .filter(move |(trigger, _)| check_activation(view, coord, *trigger).is_ok())
                .map(move |(_, status)| (coord, *status))
        })
        .collect();

    for coord in state.board.occupied() {
        if let Some(card) = state.board.get_mut(coord) {
            card.statuses.retain(|s| !s.kind.is_readiness());
        }
    }
    for (coord, status) in marks {
        if let Some(card) = state.board.get_mut(coord) {
            let owner = card.owner;
            card.statuses.add_unique(status, owner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::core::{CardId, EntityId, PlayerId};
    use crate::game::abilities::{AbilityAction, ActionKind, AutoEffect, Count};
    use crate::game::Phase;
    use crate::loader::{CardDatabase, CardDefinition};
    use std::sync::Arc;

    fn p(id: u32) -> PlayerId {
        EntityId::new(id)
    }

    fn gain() -> AbilityAction {
        AbilityAction::new(ActionKind::GlobalAutoApply {
            effect: AutoEffect::GainScore {
                amount: Count::fixed(1),
            },
        })
    }

    fn game() -> GameState {
        let mut db = CardDatabase::new();
        db.add_card(
            CardDefinition::new("sentry", "Sentry", 1)
                .with_ability(AbilityTrigger::Setup, gain())
                .with_ability(AbilityTrigger::Deploy, gain()),
        );
        GameState::new(&["A", "B"], RulesConfig::default(), Arc::new(db))
    }

    fn put(state: &mut GameState, owner: u32, coord: Coord) -> CardId {
        let id = state.next_card_id();
        let card = state
            .content
            .get_card(&"sentry".into())
            .unwrap()
            .instantiate(id, p(owner));
        assert!(state.board.place(coord, card).is_ok());
        id
    }

    fn has(state: &GameState, coord: Coord, status: StatusKind) -> bool {
        state.board.get(coord).unwrap().has_status(status)
    }

    #[test]
    fn test_markers_follow_phase_and_owner() {
        let mut state = game();
        put(&mut state, 1, Coord::new(2, 2));
        put(&mut state, 2, Coord::new(4, 4));
        refresh(&mut state);

        assert!(has(&state, Coord::new(2, 2), StatusKind::ReadySetup));
        assert!(!has(&state, Coord::new(2, 2), StatusKind::ReadyDeploy));
        assert!(!has(&state, Coord::new(4, 4), StatusKind::ReadySetup));

        state.current_phase = Phase::Main;
        state.board.get_mut(Coord::new(2, 2)).unwrap().entered_this_turn = true;
        refresh(&mut state);
        assert!(!has(&state, Coord::new(2, 2), StatusKind::ReadySetup));
        assert!(has(&state, Coord::new(2, 2), StatusKind::ReadyDeploy));
    }

    #[test]
    fn test_markers_removed_when_stunned() {
        let mut state = game();
        put(&mut state, 1, Coord::new(2, 2));
        refresh(&mut state);
        assert!(has(&state, Coord::new(2, 2), StatusKind::ReadySetup));

        state
            .board
            .get_mut(Coord::new(2, 2))
            .unwrap()
            .statuses
            .push(StatusKind::Stun, p(2));
        refresh(&mut state);
        assert!(!has(&state, Coord::new(2, 2), StatusKind::ReadySetup));
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut state = game();
        put(&mut state, 1, Coord::new(2, 2));
        refresh(&mut state);
        let once = state.board.clone();
        refresh(&mut state);
        assert_eq!(state.board, once);
    }
}
