//! Effect application for ability steps
//!
//! These run after targeting has accepted the target. Card movement goes
//! through the zone mutation engine so board bookkeeping stays in one place.

use crate::core::{CardId, Coord, PlayerId, StatusKind};
use crate::game::abilities::{AbilitySource, AutoEffect, CellEffect};
use crate::game::targeting::{accepts_status, adjacent_opponents, evaluate_count, source_coord};
use crate::game::zone_moves::{move_item, DragItem, DropTarget, ItemSource, MoveRequest};
use crate::game::{status_engine, GameEvent, GameState};

/// Add `count` entries of `status` to the card at `coord`
///
/// Returns how many were added (zero for an empty cell or an immune card).
pub fn add_status(
    state: &mut GameState,
    coord: Coord,
    status: StatusKind,
    count: u32,
    by: PlayerId,
) -> u32 {
    let accepts = state
        .board
        .get(coord)
        .is_some_and(|card| accepts_status(state, card, status));
    if !accepts {
        return 0;
    }
    if let Some(card) = state.board.get_mut(coord) {
        for _ in 0..count {
            card.statuses.push(status, by);
        }
    }
    count
}

/// Destroy the card at `coord`; a Shield entry is spent instead
pub fn destroy(state: &mut GameState, coord: Coord, actor: PlayerId) -> bool {
    let Some(card) = state.board.get_mut(coord) else {
        return false;
    };
    if card.statuses.remove_latest(StatusKind::Shield).is_some() {
        log_if_verbose!(state.logger, Verbose, "ability", "shield absorbs destroy at {}", coord);
        return false;
    }
    let (card_id, owner) = (card.id, card.owner);
    move_item(
        state,
        MoveRequest::system(
            actor,
            DragItem::Card {
                card_id,
                source: ItemSource::Board { coord },
            },
            DropTarget::Discard { player: owner },
        ),
    )
    .is_moved()
}

fn return_to_hand(state: &mut GameState, coord: Coord, actor: PlayerId) -> bool {
    let Some((card_id, owner)) = state.board.get(coord).map(|c| (c.id, c.owner)) else {
        return false;
    };
    move_item(
        state,
        MoveRequest::system(
            actor,
            DragItem::Card {
                card_id,
                source: ItemSource::Board { coord },
            },
            DropTarget::Hand { player: owner },
        ),
    )
    .is_moved()
}

/// Apply an instant effect for `source`
pub fn apply_auto_effect(state: &mut GameState, effect: &AutoEffect, source: &AbilitySource) {
    let owner = source.owner;
    match effect {
        AutoEffect::GainScore { amount } => {
            let amount = evaluate_count(state, amount, owner) as i32;
            if let Some(player) = state.player_mut(owner) {
                player.add_score(amount);
            }
            state.push_event(GameEvent::Scored {
                player: owner,
                amount,
            });
        }
        AutoEffect::DrawCards { count } => {
            let count = evaluate_count(state, count, owner) as usize;
            state.draw_cards(owner, count);
        }
        AutoEffect::AddStatusToSource { status, count } => {
            if let Some(coord) = source_coord(state, source) {
                add_status(state, coord, *status, *count, owner);
            }
        }
        AutoEffect::StatusToAdjacentOpponents { status, count } => {
            for coord in adjacent_opponents(state, source, *status) {
                add_status(state, coord, *status, *count, owner);
            }
        }
        AutoEffect::StatusToContextCard { status, count } => {
            if let Some((_, coord)) = state.context.resolve_focus(&state.board) {
                add_status(state, coord, *status, *count, owner);
            }
        }
    }
    status_engine::recalculate(state);
}

/// Apply a picked-cell effect for `source`
pub fn apply_cell_effect(state: &mut GameState, effect: &CellEffect, source: &AbilitySource, coord: Coord) {
    let owner = source.owner;
    match effect {
        CellEffect::AddStatus { status, count } => {
            add_status(state, coord, *status, *count, owner);
        }
        CellEffect::RemoveStatus { status } => {
            if let Some(card) = state.board.get_mut(coord) {
                card.statuses.remove_latest(*status);
            }
        }
        CellEffect::Destroy => {
            destroy(state, coord, owner);
        }
        CellEffect::ReturnToHand => {
            return_to_hand(state, coord, owner);
        }
        CellEffect::ModifyPower { delta } => {
            if let Some(card) = state.board.get_mut(coord) {
                card.power_modifier += delta;
            }
        }
    }
    status_engine::recalculate(state);
}

/// Move one `status` entry from card `from` to the card at `to`
///
/// The moved entry keeps its original attribution.
pub fn transfer_status(state: &mut GameState, from: CardId, to: Coord, status: StatusKind) -> bool {
    let Some(from_coord) = state.board.find_card(from) else {
        return false;
    };
    let Some(entry) = state
        .board
        .get_mut(from_coord)
        .and_then(|card| card.statuses.remove_latest(status))
    else {
        return false;
    };
    let added = add_status(state, to, status, 1, entry.added_by) > 0;
    if !added {
        // Target vanished or became immune; put the entry back
        if let Some(card) = state.board.get_mut(from_coord) {
            card.statuses.push(entry.kind, entry.added_by);
        }
    }
    status_engine::recalculate(state);
    added
}
