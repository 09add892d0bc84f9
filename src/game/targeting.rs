//! Targeting and validation
//!
//! Every predicate that decides whether an ability can act on something
//! lives here and is used both to gate execution (`has_legal_targets`) and
//! by the input handlers of the ability engine. Keeping a single copy of
//! each predicate means a step can never report "no target" while an input
//! would have been accepted, or the other way round.

use crate::core::{Card, CardId, Coord, PlayerId, StatusKind};
use crate::game::abilities::{
    AbilityAction, AbilitySource, ActionKind, ActiveMode, AutoEffect, CellEffect, CommandContext,
    ContextCard, Count, ModalSpec, ModeKind, ModeSpec, OwnerFilter, TargetFilter,
};
use crate::game::status_engine::are_opposed;
use crate::game::GameState;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One legal input for the active mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeInput {
    Cell { coord: Coord },
    Line { from: Coord, to: Coord },
    HandCard { player: PlayerId, card_id: CardId },
    /// Pick a card from the search modal, or take nothing
    SearchResult { card_id: Option<CardId> },
}

/// Current board position of the ability's card, if it is on the board
pub fn source_coord(state: &GameState, source: &AbilitySource) -> Option<Coord> {
    match source.coord {
        Some(coord) => ContextCard::new(source.card_id, coord).locate(&state.board),
        None => state.board.find_card(source.card_id),
    }
}

/// Resolve a dynamic count for `player`
pub fn evaluate_count(state: &GameState, count: &Count, player: PlayerId) -> u32 {
    match count {
        Count::Fixed { value } => *value,
        Count::StatusOnBoard { status } => state
            .board
            .cards()
            .map(|(_, c)| c.statuses.count_from(*status, player) as u32)
            .sum(),
        Count::SupportedAllies => state
            .board
            .cards()
            .filter(|(_, c)| c.owner == player && c.has_status(StatusKind::Support))
            .count() as u32,
    }
}

/// Can `card` receive `status`?
pub fn accepts_status(state: &GameState, card: &Card, status: StatusKind) -> bool {
    status != StatusKind::Stun || !state.is_stun_immune(card)
}

/// Board target predicate
pub fn matches_filter(
    state: &GameState,
    source: &AbilitySource,
    card: &Card,
    coord: Coord,
    filter: &TargetFilter,
) -> bool {
    if card.id == source.card_id && !filter.allow_source {
        return false;
    }
    let owner_ok = match filter.owner {
        OwnerFilter::Any => true,
        OwnerFilter::Own => card.owner == source.owner,
        OwnerFilter::Opponent => are_opposed(&state.players, source.owner, card.owner),
    };
    if !owner_ok {
        return false;
    }
    if filter.adjacent_to_source || filter.in_line_with_source {
        let Some(origin) = source_coord(state, source) else {
            return false;
        };
        if filter.adjacent_to_source && !origin.is_orthogonal_neighbor(coord) {
            return false;
        }
        if filter.in_line_with_source && (origin == coord || !origin.shares_line(coord)) {
            return false;
        }
    }
    if filter.required_status.is_some_and(|s| !card.has_status(s)) {
        return false;
    }
    if filter.excluded_status.is_some_and(|s| card.has_status(s)) {
        return false;
    }
    filter.card_type.map_or(true, |t| card.is_type(t))
}

fn filtered_card<'a>(
    state: &'a GameState,
    source: &AbilitySource,
    coord: Coord,
    filter: &TargetFilter,
) -> Option<&'a Card> {
    state
        .board
        .get(coord)
        .filter(|card| matches_filter(state, source, card, coord, filter))
}

/// Would `effect` do anything to `card`?
pub fn effect_applies(state: &GameState, effect: &CellEffect, card: &Card) -> bool {
    match effect {
        CellEffect::AddStatus { status, .. } => accepts_status(state, card, *status),
        CellEffect::RemoveStatus { status } => card.has_status(*status),
        CellEffect::Destroy | CellEffect::ReturnToHand | CellEffect::ModifyPower { .. } => true,
    }
}

/// Where a push of the card at `coord` would land
pub fn push_destination(
    state: &GameState,
    source: &AbilitySource,
    coord: Coord,
    filter: &TargetFilter,
) -> Option<Coord> {
    let origin = source_coord(state, source)?;
    if !origin.is_orthogonal_neighbor(coord) {
        return None;
    }
    filtered_card(state, source, coord, filter)?;
    let dest = state.board.beyond(origin, coord)?;
    state.board.is_empty_cell(dest).then_some(dest)
}

/// Opposing cards orthogonally adjacent to the source that accept `status`
pub fn adjacent_opponents(
    state: &GameState,
    source: &AbilitySource,
    status: StatusKind,
) -> SmallVec<[Coord; 4]> {
    let Some(origin) = source_coord(state, source) else {
        return SmallVec::new();
    };
    state
        .board
        .neighbors(origin)
        .into_iter()
        .filter(|c| {
            state.board.get(*c).is_some_and(|card| {
                are_opposed(&state.players, source.owner, card.owner)
                    && accepts_status(state, card, status)
            })
        })
        .collect()
}

/// Is a board cell a legal pick for the mode?
pub fn cell_is_legal(state: &GameState, mode: &ActiveMode, coord: Coord) -> bool {
    let source = &mode.source;
    match &mode.kind {
        ModeKind::CursorStack {
            token,
            filter,
            distinct,
            placed,
            ..
        } => filtered_card(state, source, coord, filter).is_some_and(|card| {
            accepts_status(state, card, *token) && !(*distinct && placed.contains(&card.id))
        }),
        ModeKind::SelectCell { effect, filter } => filtered_card(state, source, coord, filter)
            .is_some_and(|card| effect_applies(state, effect, card)),
        ModeKind::Push { filter } => push_destination(state, source, coord, filter).is_some(),
        ModeKind::Swap { filter } => {
            source_coord(state, source).is_some_and(|o| o.is_orthogonal_neighbor(coord))
                && filtered_card(state, source, coord, filter).is_some()
        }
        ModeKind::Transfer {
            status,
            filter,
            from: None,
        } => filtered_card(state, source, coord, filter).is_some_and(|card| {
            card.has_status(*status)
                && state.board.cards().any(|(other_coord, other)| {
                    other_coord != coord
                        && matches_filter(state, source, other, other_coord, filter)
                        && accepts_status(state, other, *status)
                })
        }),
        ModeKind::Transfer {
            status,
            filter,
            from: Some(from),
        } => filtered_card(state, source, coord, filter)
            .is_some_and(|card| card.id != *from && accepts_status(state, card, *status)),
        ModeKind::Spawn {
            token,
            adjacent_to_source,
        } => {
            state.content.contains(token)
                && state.board.is_empty_cell(coord)
                && (!adjacent_to_source
                    || source_coord(state, source).is_some_and(|o| o.is_orthogonal_neighbor(coord)))
        }
        ModeKind::SelectLine { .. }
        | ModeKind::SelectDiagonal { .. }
        | ModeKind::RevealHand { .. }
        | ModeKind::Search { .. } => false,
    }
}

/// Cells of a legal line/diagonal pick for the mode
pub fn line_cells(state: &GameState, mode: &ActiveMode, from: Coord, to: Coord) -> Option<Vec<Coord>> {
    let origin = source_coord(state, &mode.source);
    match &mode.kind {
        ModeKind::SelectLine { through_source } => {
            let cells = state.board.line_between(from, to)?;
            if *through_source && !origin.is_some_and(|o| cells.contains(&o)) {
                return None;
            }
            Some(cells)
        }
        ModeKind::SelectDiagonal { .. } => {
            let cells = state.board.diagonal_between(from, to)?;
            // A card on the board scores a diagonal through itself
            if origin.is_some_and(|o| !cells.contains(&o)) {
                return None;
            }
            Some(cells)
        }
        _ => None,
    }
}

/// Is revealing `card_id` from `player`'s hand a legal pick?
pub fn hand_card_is_legal(state: &GameState, mode: &ActiveMode, player: PlayerId, card_id: CardId) -> bool {
    let ModeKind::RevealHand { remaining } = mode.kind else {
        return false;
    };
    let owner = mode.source.owner;
    remaining > 0
        && are_opposed(&state.players, owner, player)
        && state
            .player(player)
            .and_then(|p| p.hand.get(card_id))
            .is_some_and(|card| !card.revealed_to.is_visible_to(owner))
}

/// Is a search result pick legal?
pub fn search_is_legal(state: &GameState, mode: &ActiveMode, card_id: Option<CardId>) -> bool {
    let ModeKind::Search { zone, card_type } = mode.kind else {
        return false;
    };
    let Some(card_id) = card_id else {
        return true;
    };
    state
        .player(mode.source.owner)
        .and_then(|p| p.zone(zone))
        .and_then(|z| z.get(card_id))
        .is_some_and(|card| card_type.map_or(true, |t| card.is_type(t)))
}

/// One representative (first, last) pair per row and column
fn line_candidates(state: &GameState) -> Vec<(Coord, Coord)> {
    let lo = state.board.offset();
    let hi = lo + state.board.active_size();
    let mut out = Vec::with_capacity(2 * state.board.active_size());
    for i in lo..hi {
        out.push((Coord::new(i, lo), Coord::new(i, hi - 1)));
        out.push((Coord::new(lo, i), Coord::new(hi - 1, i)));
    }
    out
}

/// One representative pair per diagonal of length two or more
fn diagonal_candidates(state: &GameState) -> Vec<(Coord, Coord)> {
    let mut out: Vec<(Coord, Coord)> = Vec::new();
    for a in state.board.active_coords() {
        let down_right = Some(Coord::new(a.row + 1, a.col + 1));
        let down_left = a.col.checked_sub(1).map(|col| Coord::new(a.row + 1, col));
        for b in [down_right, down_left].into_iter().flatten() {
            if let Some(cells) = state.board.diagonal_between(a, b) {
                if let (Some(first), Some(last)) = (cells.first(), cells.last()) {
                    if !out.contains(&(*first, *last)) {
                        out.push((*first, *last));
                    }
                }
            }
        }
    }
    out
}

/// Every legal input for `mode`
pub fn inputs_for(state: &GameState, mode: &ActiveMode) -> Vec<ModeInput> {
    match &mode.kind {
        ModeKind::SelectLine { .. } => line_candidates(state)
            .into_iter()
            .filter(|(from, to)| line_cells(state, mode, *from, *to).is_some())
            .map(|(from, to)| ModeInput::Line { from, to })
            .collect(),
        ModeKind::SelectDiagonal { .. } => diagonal_candidates(state)
            .into_iter()
            .filter(|(from, to)| line_cells(state, mode, *from, *to).is_some())
            .map(|(from, to)| ModeInput::Line { from, to })
            .collect(),
        ModeKind::RevealHand { .. } => state
            .players
            .iter()
            .flat_map(|p| p.hand.iter().map(move |c| (p.id, c.id)))
            .filter(|(player, card_id)| hand_card_is_legal(state, mode, *player, *card_id))
            .map(|(player, card_id)| ModeInput::HandCard { player, card_id })
            .collect(),
        ModeKind::Search { zone, .. } => {
            let mut inputs: Vec<ModeInput> = state
                .player(mode.source.owner)
                .and_then(|p| p.zone(*zone))
                .map(|z| {
                    z.iter()
                        .map(|c| c.id)
                        .filter(|id| search_is_legal(state, mode, Some(*id)))
                        .map(|id| ModeInput::SearchResult { card_id: Some(id) })
                        .collect()
                })
                .unwrap_or_default();
            inputs.push(ModeInput::SearchResult { card_id: None });
            inputs
        }
        _ => state
            .board
            .active_coords()
            .filter(|c| cell_is_legal(state, mode, *c))
            .map(|coord| ModeInput::Cell { coord })
            .collect(),
    }
}

/// Legal inputs for the state's active mode (empty when none is active)
pub fn mode_inputs(state: &GameState) -> Vec<ModeInput> {
    state
        .ability_mode
        .as_ref()
        .map(|mode| inputs_for(state, mode))
        .unwrap_or_default()
}

/// Does the mode have anything to act on?
///
/// A search always offers "take nothing", so it counts only real cards.
pub fn mode_has_targets(state: &GameState, mode: &ActiveMode) -> bool {
    match &mode.kind {
        ModeKind::Search { .. } => inputs_for(state, mode)
            .iter()
            .any(|i| matches!(i, ModeInput::SearchResult { card_id: Some(_) })),
        ModeKind::SelectLine { .. } | ModeKind::SelectDiagonal { .. } | ModeKind::RevealHand { .. } => {
            !inputs_for(state, mode).is_empty()
        }
        _ => state
            .board
            .active_coords()
            .any(|c| cell_is_legal(state, mode, c)),
    }
}

/// Runtime mode for a mode-entering action, with counts evaluated now
///
/// None for actions that do not enter a mode, or whose count is zero.
pub fn mode_for(state: &GameState, kind: &ActionKind, source: &AbilitySource) -> Option<ActiveMode> {
    let mode_kind = match kind {
        ActionKind::CreateStack {
            token,
            count,
            filter,
            distinct,
        } => {
            let remaining = evaluate_count(state, count, source.owner);
            if remaining == 0 {
                return None;
            }
            ModeKind::CursorStack {
                token: *token,
                remaining,
                filter: filter.clone(),
                distinct: *distinct,
                placed: SmallVec::new(),
            }
        }
        ActionKind::EnterMode { mode } => mode_kind_for(state, mode, source)?,
        ActionKind::OpenModal { modal } => match modal {
            ModalSpec::SearchDeck { .. } | ModalSpec::RetrieveFromDiscard { .. } => ModeKind::Search {
                zone: modal.zone(),
                card_type: modal.card_type(),
            },
        },
        ActionKind::Composite { composite } => mode_kind_for(state, &composite.follow_up(), source)?,
        ActionKind::GlobalAutoApply { .. } | ActionKind::AbilityComplete => return None,
    };
    Some(ActiveMode {
        kind: mode_kind,
        source: source.clone(),
        chained: None,
    })
}

fn mode_kind_for(state: &GameState, spec: &ModeSpec, source: &AbilitySource) -> Option<ModeKind> {
    Some(match spec {
        ModeSpec::SelectCell { effect, filter } => ModeKind::SelectCell {
            effect: effect.clone(),
            filter: filter.clone(),
        },
        ModeSpec::SelectLine { through_source } => ModeKind::SelectLine {
            through_source: *through_source,
        },
        ModeSpec::SelectDiagonal { bonus } => ModeKind::SelectDiagonal { bonus: *bonus },
        ModeSpec::Push { filter } => ModeKind::Push {
            filter: filter.clone(),
        },
        ModeSpec::Swap { filter } => ModeKind::Swap {
            filter: filter.clone(),
        },
        ModeSpec::Transfer { status, filter } => ModeKind::Transfer {
            status: *status,
            filter: filter.clone(),
            from: None,
        },
        ModeSpec::RevealHand { count } => {
            let remaining = evaluate_count(state, count, source.owner);
            if remaining == 0 {
                return None;
            }
            ModeKind::RevealHand { remaining }
        }
        ModeSpec::Spawn {
            token,
            adjacent_to_source,
        } => ModeKind::Spawn {
            token: token.clone(),
            adjacent_to_source: *adjacent_to_source,
        },
    })
}

fn auto_effect_has_target(
    state: &GameState,
    effect: &AutoEffect,
    source: &AbilitySource,
    context: &CommandContext,
) -> bool {
    match effect {
        AutoEffect::GainScore { .. } => true,
        AutoEffect::DrawCards { .. } => state
            .player(source.owner)
            .is_some_and(|p| !p.deck.is_empty()),
        AutoEffect::AddStatusToSource { status, .. } => source_coord(state, source)
            .and_then(|c| state.board.get(c))
            .is_some_and(|card| accepts_status(state, card, *status)),
        AutoEffect::StatusToAdjacentOpponents { status, .. } => {
            !adjacent_opponents(state, source, *status).is_empty()
        }
        AutoEffect::StatusToContextCard { status, .. } => context
            .resolve_focus(&state.board)
            .and_then(|(_, c)| state.board.get(c))
            .is_some_and(|card| accepts_status(state, card, *status)),
    }
}

/// Does this step have anything to act on for `source.owner`?
///
/// Composite steps always apply their first part, so they always qualify;
/// their follow-up mode is checked separately when it is entered.
pub fn has_legal_targets(
    action: &AbilityAction,
    state: &GameState,
    source: &AbilitySource,
    context: &CommandContext,
) -> bool {
    match &action.kind {
        ActionKind::AbilityComplete | ActionKind::Composite { .. } => true,
        ActionKind::GlobalAutoApply { effect } => auto_effect_has_target(state, effect, source, context),
        kind => mode_for(state, kind, source).is_some_and(|mode| mode_has_targets(state, &mode)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::core::EntityId;
    use crate::game::abilities::AbilityTrigger;
    use crate::loader::{CardDatabase, CardDefinition, Passive};
    use std::sync::Arc;

    fn p(id: u32) -> PlayerId {
        EntityId::new(id)
    }

    fn game() -> GameState {
        let mut db = CardDatabase::new();
        db.add_card(CardDefinition::new("wall", "Wall", 1).with_passive(Passive::StunImmune));
        db.add_card(CardDefinition::new("drone", "Drone", 1));
        GameState::new(&["A", "B"], RulesConfig::default(), Arc::new(db))
    }

    fn put(state: &mut GameState, owner: u32, coord: Coord) -> CardId {
        let id = state.next_card_id();
        assert!(state.board.place(coord, Card::new(id, "C", p(owner), 1)).is_ok());
        id
    }

    fn source(card_id: CardId, coord: Coord) -> AbilitySource {
        AbilitySource {
            card_id,
            coord: Some(coord),
            owner: p(1),
            controller: p(1),
            trigger: AbilityTrigger::Setup,
        }
    }

    fn mode(kind: ModeKind, src: AbilitySource) -> ActiveMode {
        ActiveMode {
            kind,
            source: src,
            chained: None,
        }
    }

    #[test]
    fn test_filter_excludes_source_unless_allowed() {
        let mut state = game();
        let me = put(&mut state, 1, Coord::new(3, 3));
        let src = source(me, Coord::new(3, 3));
        let card = state.board.get(Coord::new(3, 3)).unwrap();
        assert!(!matches_filter(&state, &src, card, Coord::new(3, 3), &TargetFilter::default()));
        let allow = TargetFilter {
            allow_source: true,
            ..TargetFilter::default()
        };
        assert!(matches_filter(&state, &src, card, Coord::new(3, 3), &allow));
    }

    #[test]
    fn test_adjacent_opponent_filter() {
        let mut state = game();
        let me = put(&mut state, 1, Coord::new(3, 3));
        put(&mut state, 2, Coord::new(3, 4));
        put(&mut state, 2, Coord::new(1, 1));
        put(&mut state, 1, Coord::new(2, 3));
        let m = mode(
            ModeKind::SelectCell {
                effect: CellEffect::Destroy,
                filter: TargetFilter::opponents().adjacent(),
            },
            source(me, Coord::new(3, 3)),
        );
        let inputs = inputs_for(&state, &m);
        assert_eq!(
            inputs,
            vec![ModeInput::Cell {
                coord: Coord::new(3, 4)
            }]
        );
    }

    #[test]
    fn test_stun_immune_is_not_a_stun_target() {
        let mut state = game();
        let me = put(&mut state, 1, Coord::new(3, 3));
        put(&mut state, 2, Coord::new(3, 4));
        state.board.get_mut(Coord::new(3, 4)).unwrap().base_id = Some("wall".into());
        let src = source(me, Coord::new(3, 3));

        let action = AbilityAction::new(ActionKind::GlobalAutoApply {
            effect: AutoEffect::StatusToAdjacentOpponents {
                status: StatusKind::Stun,
                count: 1,
            },
        });
        assert!(!has_legal_targets(&action, &state, &src, &CommandContext::new()));

        let shield = AbilityAction::new(ActionKind::GlobalAutoApply {
            effect: AutoEffect::StatusToAdjacentOpponents {
                status: StatusKind::Shield,
                count: 1,
            },
        });
        assert!(has_legal_targets(&shield, &state, &src, &CommandContext::new()));
    }

    #[test]
    fn test_push_needs_empty_cell_beyond() {
        let mut state = game();
        let me = put(&mut state, 1, Coord::new(3, 3));
        put(&mut state, 2, Coord::new(3, 4));
        let src = source(me, Coord::new(3, 3));
        let filter = TargetFilter::opponents();
        assert_eq!(
            push_destination(&state, &src, Coord::new(3, 4), &filter),
            Some(Coord::new(3, 5))
        );
        put(&mut state, 1, Coord::new(3, 5));
        assert_eq!(push_destination(&state, &src, Coord::new(3, 4), &filter), None);
    }

    #[test]
    fn test_zero_count_stack_has_no_targets() {
        let mut state = game();
        let me = put(&mut state, 1, Coord::new(3, 3));
        put(&mut state, 2, Coord::new(3, 4));
        let src = source(me, Coord::new(3, 3));
        let stack = |count| {
            AbilityAction::new(ActionKind::CreateStack {
                token: StatusKind::Aim,
                count,
                filter: TargetFilter::opponents(),
                distinct: false,
            })
        };
        let ctx = CommandContext::new();
        assert!(has_legal_targets(&stack(Count::fixed(2)), &state, &src, &ctx));
        assert!(!has_legal_targets(&stack(Count::fixed(0)), &state, &src, &ctx));
        // No Exploit tokens placed by player 1 yet
        assert!(!has_legal_targets(
            &stack(Count::StatusOnBoard {
                status: StatusKind::Exploit
            }),
            &state,
            &src,
            &ctx
        ));
    }

    #[test]
    fn test_line_inputs_through_source() {
        let mut state = game();
        let me = put(&mut state, 1, Coord::new(2, 4));
        let m = mode(
            ModeKind::SelectLine {
                through_source: true,
            },
            source(me, Coord::new(2, 4)),
        );
        let inputs = inputs_for(&state, &m);
        assert_eq!(inputs.len(), 2);

        let diag = mode(ModeKind::SelectDiagonal { bonus: None }, source(me, Coord::new(2, 4)));
        let inputs = inputs_for(&state, &diag);
        assert_eq!(inputs.len(), 2);
        for input in inputs {
            let ModeInput::Line { from, to } = input else {
                panic!("expected a line input");
            };
            assert!(line_cells(&state, &diag, from, to)
                .unwrap()
                .contains(&Coord::new(2, 4)));
        }
    }

    #[test]
    fn test_reveal_hand_targets_unrevealed_opponent_cards() {
        let mut state = game();
        let me = put(&mut state, 1, Coord::new(3, 3));
        let hidden = state.next_card_id();
        state
            .get_player_mut(p(2))
            .unwrap()
            .hand
            .add(Card::new(hidden, "H", p(2), 1));
        let own = state.next_card_id();
        state
            .get_player_mut(p(1))
            .unwrap()
            .hand
            .add(Card::new(own, "O", p(1), 1));

        let m = mode(ModeKind::RevealHand { remaining: 1 }, source(me, Coord::new(3, 3)));
        assert!(hand_card_is_legal(&state, &m, p(2), hidden));
        assert!(!hand_card_is_legal(&state, &m, p(1), own));
        assert_eq!(inputs_for(&state, &m).len(), 1);
    }

    #[test]
    fn test_search_always_offers_nothing() {
        let mut state = game();
        let me = put(&mut state, 1, Coord::new(3, 3));
        let m = mode(
            ModeKind::Search {
                zone: crate::zones::Zone::Deck,
                card_type: None,
            },
            source(me, Coord::new(3, 3)),
        );
        assert_eq!(
            inputs_for(&state, &m),
            vec![ModeInput::SearchResult { card_id: None }]
        );
        assert!(!mode_has_targets(&state, &m));
    }

    #[test]
    fn test_spawn_requires_known_token() {
        let mut state = game();
        let me = put(&mut state, 1, Coord::new(3, 3));
        let src = source(me, Coord::new(3, 3));
        let known = mode(
            ModeKind::Spawn {
                token: "drone".into(),
                adjacent_to_source: true,
            },
            src.clone(),
        );
        assert_eq!(inputs_for(&state, &known).len(), 4);
        let unknown = mode(
            ModeKind::Spawn {
                token: "ghost".into(),
                adjacent_to_source: false,
            },
            src,
        );
        assert!(!mode_has_targets(&state, &unknown));
    }
}
