//! Zone mutation engine
//!
//! [`move_item`] is the single entry point for moving a card between
//! hand, deck, discard, announced slot and board cells, and for dropping
//! counters onto board cards. A card is removed from its source and
//! inserted at its destination within one call, so it is never in two
//! zones at once. Rejected moves leave the state untouched.

use crate::core::{Card, CardId, Coord, DefinitionId, PlayerId, StatusKind};
use crate::game::status_engine::{self, are_opposed};
use crate::game::{CardLocation, GameEvent, GameState};
use crate::zones::Zone;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;
use thiserror::Error;

/// Where a dragged card is picked up from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemSource {
    Hand { player: PlayerId },
    Deck { player: PlayerId },
    Discard { player: PlayerId },
    Announced { player: PlayerId },
    Board { coord: Coord },
}

impl ItemSource {
    pub fn zone(&self) -> Zone {
        match self {
            ItemSource::Hand { .. } => Zone::Hand,
            ItemSource::Deck { .. } => Zone::Deck,
            ItemSource::Discard { .. } => Zone::Discard,
            ItemSource::Announced { .. } => Zone::Announced,
            ItemSource::Board { .. } => Zone::Board,
        }
    }

    /// Source describing where a card currently is
    pub fn from_location(loc: CardLocation) -> Self {
        let player = loc.player;
        match (loc.zone, loc.coord) {
            (Zone::Board, Some(coord)) => ItemSource::Board { coord },
            (Zone::Deck, _) => ItemSource::Deck { player },
            (Zone::Discard, _) => ItemSource::Discard { player },
            (Zone::Announced, _) => ItemSource::Announced { player },
            _ => ItemSource::Hand { player },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeckPosition {
    #[default]
    Top,
    Bottom,
}

/// Where an item is dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropTarget {
    Hand { player: PlayerId },
    Deck { player: PlayerId, position: DeckPosition },
    Discard { player: PlayerId },
    Announced { player: PlayerId },
    Board { coord: Coord },
}

impl DropTarget {
    pub fn zone(&self) -> Zone {
        match self {
            DropTarget::Hand { .. } => Zone::Hand,
            DropTarget::Deck { .. } => Zone::Deck,
            DropTarget::Discard { .. } => Zone::Discard,
            DropTarget::Announced { .. } => Zone::Announced,
            DropTarget::Board { .. } => Zone::Board,
        }
    }

    fn player(&self) -> Option<PlayerId> {
        match self {
            DropTarget::Hand { player }
            | DropTarget::Deck { player, .. }
            | DropTarget::Discard { player }
            | DropTarget::Announced { player } => Some(*player),
            DropTarget::Board { .. } => None,
        }
    }
}

/// The thing being moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragItem {
    /// An exclusive card, located at `source` (or anywhere, by id)
    Card { card_id: CardId, source: ItemSource },
    /// A non-exclusive counter from the counter panel
    Counter { status: StatusKind, count: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub item: DragItem,
    pub target: DropTarget,
    pub actor: PlayerId,
    /// Player-initiated (false for ability-driven moves)
    pub is_manual: bool,
    /// Granted by the ability engine to skip the ownership check
    pub bypass_ownership: bool,
    /// Enter the board face down
    pub face_down: bool,
}

impl MoveRequest {
    /// A move made directly by a player
    pub fn manual(actor: PlayerId, item: DragItem, target: DropTarget) -> Self {
        MoveRequest {
            item,
            target,
            actor,
            is_manual: true,
            bypass_ownership: false,
            face_down: false,
        }
    }

    /// A move made by an ability effect
    pub fn system(actor: PlayerId, item: DragItem, target: DropTarget) -> Self {
        MoveRequest {
            is_manual: false,
            bypass_ownership: true,
            ..MoveRequest::manual(actor, item, target)
        }
    }

    pub fn face_down(mut self) -> Self {
        self.face_down = true;
        self
    }
}

/// Why a move did not happen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MoveRejection {
    #[error("card not found")]
    CardNotFound,
    #[error("target cell is occupied")]
    CellOccupied,
    #[error("target cell is outside the active grid")]
    OutsideActiveGrid,
    #[error("no card at target cell")]
    NoCardAtTarget,
    #[error("announced slot is full")]
    AnnouncedSlotFull,
    #[error("zone belongs to another player")]
    ForeignZone,
    #[error("actor does not own the card")]
    NotOwner,
    #[error("card is stunned")]
    StunLocked,
    #[error("counter is not defined")]
    UnknownCounter,
    #[error("card is immune to that counter")]
    Immune,
    #[error("game is over")]
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum MoveOutcome {
    Moved,
    Rejected(MoveRejection),
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved)
    }
}

/// Move a card or drop a counter
pub fn move_item(state: &mut GameState, request: MoveRequest) -> MoveOutcome {
    let result = if state.is_game_over() {
        Err(MoveRejection::GameOver)
    } else {
        match request.item {
            DragItem::Card { card_id, source } => move_card(state, &request, card_id, source),
            DragItem::Counter { status, count } => {
                place_counter(state, request.actor, status, count, request.target)
            }
        }
    };

    match result {
        Ok(()) => MoveOutcome::Moved,
        Err(reason) => {
            log_if_verbose!(
                state.logger,
                Verbose,
                "move",
                "player {} move {:?} -> {:?} rejected: {}",
                request.actor,
                request.item,
                request.target,
                reason
            );
            MoveOutcome::Rejected(reason)
        }
    }
}

/// Resolve the card's location: the stated source first, then an id search
fn resolve_source(state: &GameState, card_id: CardId, source: ItemSource) -> Option<CardLocation> {
    let stated = match source {
        ItemSource::Board { coord } => state
            .board
            .get(coord)
            .filter(|c| c.id == card_id)
            .map(|c| CardLocation {
                player: c.owner,
                zone: Zone::Board,
                coord: Some(coord),
            }),
        ItemSource::Announced { player } => state
            .player(player)
            .and_then(|p| p.announced.as_ref())
            .filter(|c| c.id == card_id)
            .map(|_| CardLocation {
                player,
                zone: Zone::Announced,
                coord: None,
            }),
        ItemSource::Hand { player } | ItemSource::Deck { player } | ItemSource::Discard { player } => {
            let zone = source.zone();
            state
                .player(player)
                .and_then(|p| p.zone(zone))
                .filter(|z| z.contains(card_id))
                .map(|_| CardLocation {
                    player,
                    zone,
                    coord: None,
                })
        }
    };
    stated.or_else(|| state.locate_card(card_id))
}

fn validate_target(state: &GameState, card: &Card, target: DropTarget) -> Result<(), MoveRejection> {
    match target {
        DropTarget::Board { coord } => {
            if !state.board.in_active(coord) {
                Err(MoveRejection::OutsideActiveGrid)
            } else if state.board.get(coord).is_some() {
                Err(MoveRejection::CellOccupied)
            } else {
                Ok(())
            }
        }
        DropTarget::Announced { player } => match state.player(player) {
            None => Err(MoveRejection::CardNotFound),
            Some(_) if player != card.owner => Err(MoveRejection::ForeignZone),
            Some(p) if p.announced.is_some() => Err(MoveRejection::AnnouncedSlotFull),
            Some(_) => Ok(()),
        },
        _ => {
            let player = target.player().ok_or(MoveRejection::CardNotFound)?;
            if state.player(player).is_none() {
                Err(MoveRejection::CardNotFound)
            } else if player != card.owner {
                Err(MoveRejection::ForeignZone)
            } else {
                Ok(())
            }
        }
    }
}

fn move_card(
    state: &mut GameState,
    request: &MoveRequest,
    card_id: CardId,
    source: ItemSource,
) -> Result<(), MoveRejection> {
    let from = resolve_source(state, card_id, source).ok_or(MoveRejection::CardNotFound)?;
    let card = state.card(card_id).ok_or(MoveRejection::CardNotFound)?;
    let owner = card.owner;
    let to_zone = request.target.zone();

    validate_target(state, card, request.target)?;

    if from.zone == Zone::Board
        && to_zone.is_storage()
        && !request.bypass_ownership
        && !state.can_control(request.actor, owner)
    {
        return Err(MoveRejection::NotOwner);
    }

    if request.is_manual
        && card.is_stunned()
        && (state.is_teammate(request.actor, owner) || state.can_control(request.actor, owner))
    {
        return Err(MoveRejection::StunLocked);
    }

    let mut card = take_card(state, from, card_id).ok_or(MoveRejection::CardNotFound)?;
    let from_board = from.zone == Zone::Board;
    let to_board = to_zone == Zone::Board;

    if !to_board {
        card.reset_for_storage();
    } else if !from_board {
        prepare_board_entry(state, &mut card, from.zone, request.face_down);
    }
    let revealed_entry = to_board && !from_board && card.is_revealed() && !card.is_face_down;

    if let Err(card) = put_card(state, request.target, card) {
        // Validation passed, so this only restores the source on a broken invariant
        let _ = put_card(state, restore_target(from), card);
        return Err(MoveRejection::CardNotFound);
    }

    if let Some(player) = state.player_mut(owner) {
        if from_board && !to_board {
            player.forget_played(card_id);
        } else if to_board && !from_board {
            player.record_played(card_id);
        }
    }
    if from_board != to_board {
        refresh_last_played(state, owner);
    }

    if let DropTarget::Board { coord } = request.target {
        if !request.is_manual {
            state.context.record_move(card_id, coord);
        }
    }

    status_engine::recalculate(state);

    if revealed_entry {
        reward_spotters(state, card_id, owner);
    }

    log_if_verbose!(
        state.logger,
        Verbose,
        "move",
        "card {} {:?} -> {:?} by player {}",
        card_id,
        from.zone,
        request.target,
        request.actor
    );
    Ok(())
}

/// Zone-entry setup for a card arriving on the board from off-board
fn prepare_board_entry(state: &GameState, card: &mut Card, from: Zone, face_down: bool) {
    card.is_face_down = face_down;
    card.entered_this_turn = true;
    card.deploy_ability_consumed = false;
    card.ability_used_in_phase = None;

    if from == Zone::Discard {
        card.statuses.push(StatusKind::Resurrected, card.owner);
        if let Some(boost) = state.definition(card).and_then(|d| d.resurrection_boost()) {
            card.bonus_power += boost;
        }
    }
}

fn take_card(state: &mut GameState, loc: CardLocation, card_id: CardId) -> Option<Card> {
    match loc.zone {
        Zone::Board => {
            let coord = loc.coord?;
            if state.board.get(coord)?.id != card_id {
                return None;
            }
            state.board.take(coord)
        }
        Zone::Announced => {
            let player = state.player_mut(loc.player)?;
            if player.announced.as_ref()?.id != card_id {
                return None;
            }
            player.announced.take()
        }
        zone => state.player_mut(loc.player)?.zone_mut(zone)?.remove(card_id),
    }
}

fn put_card(state: &mut GameState, target: DropTarget, card: Card) -> Result<(), Card> {
    match target {
        DropTarget::Board { coord } => state.board.place(coord, card),
        DropTarget::Announced { player } => match state.player_mut(player) {
            Some(p) if p.announced.is_none() => {
                p.announced = Some(card);
                Ok(())
            }
            _ => Err(card),
        },
        DropTarget::Deck { player, position } => match state.player_mut(player) {
            Some(p) => {
                match position {
                    DeckPosition::Top => p.deck.add(card),
                    DeckPosition::Bottom => p.deck.add_to_bottom(card),
                }
                Ok(())
            }
            None => Err(card),
        },
        DropTarget::Hand { player } | DropTarget::Discard { player } => {
            match state.player_mut(player).and_then(|p| p.zone_mut(target.zone())) {
                Some(zone) => {
                    zone.add(card);
                    Ok(())
                }
                None => Err(card),
            }
        }
    }
}

fn restore_target(loc: CardLocation) -> DropTarget {
    let player = loc.player;
    match (loc.zone, loc.coord) {
        (Zone::Board, Some(coord)) => DropTarget::Board { coord },
        (Zone::Deck, _) => DropTarget::Deck {
            player,
            position: DeckPosition::Top,
        },
        (Zone::Discard, _) => DropTarget::Discard { player },
        (Zone::Announced, _) => DropTarget::Announced { player },
        _ => DropTarget::Hand { player },
    }
}

/// Re-derive LastPlayed for one owner from their board history
pub fn refresh_last_played(state: &mut GameState, owner: PlayerId) {
    let coords = state.board.occupied();
    for coord in &coords {
        if let Some(card) = state.board.get_mut(*coord) {
            if card.owner == owner {
                card.statuses.remove_all(StatusKind::LastPlayed);
            }
        }
    }

    let Some(player) = state.player(owner) else {
        return;
    };
    let latest = player
        .board_history
        .iter()
        .rev()
        .find_map(|id| state.board.find_card(*id));
    if let Some(coord) = latest {
        if let Some(card) = state.board.get_mut(coord) {
            card.statuses.push(StatusKind::LastPlayed, owner);
        }
    }
}

/// Supported opposing spotters score when a revealed card enters the board
fn reward_spotters(state: &mut GameState, entered: CardId, entering_owner: PlayerId) {
    let content = Arc::clone(&state.content);
    let gains: SmallVec<[(PlayerId, i32, Coord); 4]> = state
        .board
        .cards()
        .filter(|(_, c)| c.id != entered)
        .filter(|(_, c)| are_opposed(&state.players, c.owner, entering_owner))
        .filter(|(_, c)| c.has_status(StatusKind::Support) && !c.is_stunned())
        .filter_map(|(coord, c)| {
            let bonus = c
                .base_id
                .as_ref()
                .and_then(|id| content.get_card(id))
                .and_then(|d| d.spotter_bonus())?;
            Some((c.owner, bonus, coord))
        })
        .collect();

    for (player, bonus, coord) in gains {
        if let Some(p) = state.player_mut(player) {
            p.add_score(bonus);
        }
        state.push_event(GameEvent::FloatingText {
            coord,
            text: format!("+{bonus}"),
            player,
        });
        state.push_event(GameEvent::Scored {
            player,
            amount: bonus,
        });
        log_if_verbose!(
            state.logger,
            Normal,
            "passive",
            "spotter at {} scores {} for player {}",
            coord,
            bonus,
            player
        );
    }
}

/// Drop `count` counters of `status` onto an occupied board cell
fn place_counter(
    state: &mut GameState,
    actor: PlayerId,
    status: StatusKind,
    count: u32,
    target: DropTarget,
) -> Result<(), MoveRejection> {
    if state.content.get_counter(status).is_none() {
        return Err(MoveRejection::UnknownCounter);
    }
    let DropTarget::Board { coord } = target else {
        return Err(MoveRejection::NoCardAtTarget);
    };
    let card = state.board.get(coord).ok_or(MoveRejection::NoCardAtTarget)?;
    if status == StatusKind::Stun && state.is_stun_immune(card) {
        return Err(MoveRejection::Immune);
    }
    if let Some(card) = state.board.get_mut(coord) {
        for _ in 0..count {
            card.statuses.push(status, actor);
        }
    }
    status_engine::recalculate(state);
    Ok(())
}

/// Exchange two active cells (either may be empty)
pub fn swap_cells(state: &mut GameState, a: Coord, b: Coord) -> bool {
    if !state.board.swap(a, b) {
        return false;
    }
    for coord in [a, b] {
        if let Some(id) = state.board.get(coord).map(|c| c.id) {
            state.context.record_move(id, coord);
        }
    }
    status_engine::recalculate(state);
    true
}

/// Create a token instance on an empty active cell
pub fn spawn_card(
    state: &mut GameState,
    definition: &DefinitionId,
    owner: PlayerId,
    coord: Coord,
) -> Option<CardId> {
    if !state.board.is_empty_cell(coord) {
        return None;
    }
    let content = Arc::clone(&state.content);
    let def = content.get_card(definition)?;
    let id = state.next_card_id();
    let mut card = def.instantiate(id, owner);
    card.entered_this_turn = true;
    state.board.place(coord, card).ok()?;
    state.context.record_move(id, coord);
    status_engine::recalculate(state);
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::core::{EntityId, Player};
    use crate::loader::{CardDatabase, CardDefinition, CounterDefinition, Passive};

    fn p(id: u32) -> PlayerId {
        EntityId::new(id)
    }

    fn content() -> Arc<CardDatabase> {
        let mut db = CardDatabase::new();
        db.add_card(CardDefinition::new("unit", "Unit", 2));
        db.add_card(
            CardDefinition::new("hero_phoenix", "Phoenix", 3)
                .with_passive(Passive::ResurrectionBoost { amount: 2 }),
        );
        db.add_card(
            CardDefinition::new("spotter", "Spotter", 1).with_passive(Passive::Spotter { bonus: 2 }),
        );
        db.add_card(CardDefinition::new("wall", "Wall", 0).with_passive(Passive::StunImmune));
        db.add_counter(CounterDefinition {
            status: StatusKind::Stun,
            label: "Stun".to_string(),
        });
        Arc::new(db)
    }

    fn game() -> GameState {
        GameState::new(&["A", "B"], RulesConfig::default(), content())
    }

    fn add_to_hand(state: &mut GameState, owner: PlayerId, def: &str) -> CardId {
        let id = state.next_card_id();
        let content = Arc::clone(&state.content);
        let card = content
            .get_card(&def.into())
            .unwrap()
            .instantiate(id, owner);
        state.get_player_mut(owner).unwrap().hand.add(card);
        id
    }

    fn play(state: &mut GameState, owner: PlayerId, id: CardId, coord: Coord) -> MoveOutcome {
        move_item(
            state,
            MoveRequest::manual(
                owner,
                DragItem::Card {
                    card_id: id,
                    source: ItemSource::Hand { player: owner },
                },
                DropTarget::Board { coord },
            ),
        )
    }

    fn owner_player(state: &GameState, id: PlayerId) -> &Player {
        state.get_player(id).unwrap()
    }

    #[test]
    fn test_play_from_hand_sets_entry_flags() {
        let mut state = game();
        let id = add_to_hand(&mut state, p(1), "unit");
        assert!(play(&mut state, p(1), id, Coord::new(3, 3)).is_moved());

        let card = state.board.get(Coord::new(3, 3)).unwrap();
        assert!(card.entered_this_turn);
        assert!(!card.is_face_down);
        assert!(card.has_status(StatusKind::LastPlayed));
        assert!(owner_player(&state, p(1)).hand.is_empty());
        assert_eq!(owner_player(&state, p(1)).board_history, vec![id]);
    }

    #[test]
    fn test_occupied_and_inactive_cells_rejected() {
        let mut state = game();
        let a = add_to_hand(&mut state, p(1), "unit");
        let b = add_to_hand(&mut state, p(1), "unit");
        assert!(play(&mut state, p(1), a, Coord::new(3, 3)).is_moved());
        assert_eq!(
            play(&mut state, p(1), b, Coord::new(3, 3)),
            MoveOutcome::Rejected(MoveRejection::CellOccupied)
        );
        assert_eq!(
            play(&mut state, p(1), b, Coord::new(0, 0)),
            MoveOutcome::Rejected(MoveRejection::OutsideActiveGrid)
        );
        assert_eq!(state.card_count(b), 1);
    }

    #[test]
    fn test_last_played_falls_back_through_history() {
        let mut state = game();
        let a = add_to_hand(&mut state, p(1), "unit");
        let b = add_to_hand(&mut state, p(1), "unit");
        assert!(play(&mut state, p(1), a, Coord::new(2, 2)).is_moved());
        assert!(play(&mut state, p(1), b, Coord::new(4, 4)).is_moved());
        assert!(!state.board.get(Coord::new(2, 2)).unwrap().has_status(StatusKind::LastPlayed));

        let outcome = move_item(
            &mut state,
            MoveRequest::manual(
                p(1),
                DragItem::Card {
                    card_id: b,
                    source: ItemSource::Board {
                        coord: Coord::new(4, 4),
                    },
                },
                DropTarget::Hand { player: p(1) },
            ),
        );
        assert!(outcome.is_moved());
        assert!(state.board.get(Coord::new(2, 2)).unwrap().has_status(StatusKind::LastPlayed));
        assert_eq!(owner_player(&state, p(1)).board_history, vec![a]);
    }

    #[test]
    fn test_non_owner_cannot_return_card_to_storage() {
        let mut state = game();
        let a = add_to_hand(&mut state, p(1), "unit");
        assert!(play(&mut state, p(1), a, Coord::new(2, 2)).is_moved());

        let request = MoveRequest::manual(
            p(2),
            DragItem::Card {
                card_id: a,
                source: ItemSource::Board {
                    coord: Coord::new(2, 2),
                },
            },
            DropTarget::Discard { player: p(1) },
        );
        assert_eq!(
            move_item(&mut state, request),
            MoveOutcome::Rejected(MoveRejection::NotOwner)
        );
        let bypass = MoveRequest {
            bypass_ownership: true,
            ..request
        };
        assert!(move_item(&mut state, bypass).is_moved());
        assert!(owner_player(&state, p(1)).discard.contains(a));
    }

    #[test]
    fn test_storage_reset_keeps_revealed() {
        let mut state = game();
        let a = add_to_hand(&mut state, p(1), "unit");
        assert!(play(&mut state, p(1), a, Coord::new(2, 2)).is_moved());
        {
            let card = state.board.get_mut(Coord::new(2, 2)).unwrap();
            card.power_modifier = 3;
            card.statuses.push(StatusKind::Revealed, p(2));
            card.statuses.push(StatusKind::Shield, p(1));
        }
        let request = MoveRequest::manual(
            p(1),
            DragItem::Card {
                card_id: a,
                source: ItemSource::Board {
                    coord: Coord::new(2, 2),
                },
            },
            DropTarget::Hand { player: p(1) },
        );
        assert!(move_item(&mut state, request).is_moved());
        let card = owner_player(&state, p(1)).hand.get(a).unwrap();
        assert_eq!(card.power_modifier, 0);
        assert_eq!(card.statuses.len(), 1);
        assert!(card.has_status(StatusKind::Revealed));
    }

    #[test]
    fn test_resurrection_from_discard() {
        let mut state = game();
        let id = state.next_card_id();
        let card = state
            .content
            .get_card(&"hero_phoenix".into())
            .unwrap()
            .instantiate(id, p(1));
        state.get_player_mut(p(1)).unwrap().discard.add(card);

        let request = MoveRequest::manual(
            p(1),
            DragItem::Card {
                card_id: id,
                source: ItemSource::Discard { player: p(1) },
            },
            DropTarget::Board {
                coord: Coord::new(3, 3),
            },
        );
        assert!(move_item(&mut state, request).is_moved());
        let card = state.board.get(Coord::new(3, 3)).unwrap();
        assert!(card.has_status(StatusKind::Resurrected));
        assert_eq!(card.bonus_power, 2);
        assert_eq!(card.effective_power(), 5);
    }

    #[test]
    fn test_stale_source_falls_back_to_id_search() {
        let mut state = game();
        let a = add_to_hand(&mut state, p(1), "unit");
        let request = MoveRequest::manual(
            p(1),
            DragItem::Card {
                card_id: a,
                source: ItemSource::Discard { player: p(1) },
            },
            DropTarget::Board {
                coord: Coord::new(3, 3),
            },
        );
        assert!(move_item(&mut state, request).is_moved());
        // Came from hand, so no resurrection
        assert!(!state.board.get(Coord::new(3, 3)).unwrap().has_status(StatusKind::Resurrected));
    }

    #[test]
    fn test_announced_slot_holds_one_card() {
        let mut state = game();
        let a = add_to_hand(&mut state, p(1), "unit");
        let b = add_to_hand(&mut state, p(1), "unit");
        let announce = |id| {
            MoveRequest::manual(
                p(1),
                DragItem::Card {
                    card_id: id,
                    source: ItemSource::Hand { player: p(1) },
                },
                DropTarget::Announced { player: p(1) },
            )
        };
        assert!(move_item(&mut state, announce(a)).is_moved());
        assert_eq!(
            move_item(&mut state, announce(b)),
            MoveOutcome::Rejected(MoveRejection::AnnouncedSlotFull)
        );
    }

    #[test]
    fn test_counter_placement() {
        let mut state = game();
        let a = add_to_hand(&mut state, p(1), "unit");
        let w = add_to_hand(&mut state, p(1), "wall");
        assert!(play(&mut state, p(1), a, Coord::new(2, 2)).is_moved());
        assert!(play(&mut state, p(1), w, Coord::new(4, 4)).is_moved());

        let stun = |coord| {
            MoveRequest::manual(
                p(2),
                DragItem::Counter {
                    status: StatusKind::Stun,
                    count: 2,
                },
                DropTarget::Board { coord },
            )
        };
        assert!(move_item(&mut state, stun(Coord::new(2, 2))).is_moved());
        assert_eq!(
            state
                .board
                .get(Coord::new(2, 2))
                .unwrap()
                .statuses
                .count_from(StatusKind::Stun, p(2)),
            2
        );
        assert_eq!(
            move_item(&mut state, stun(Coord::new(4, 4))),
            MoveOutcome::Rejected(MoveRejection::Immune)
        );
        assert_eq!(
            move_item(&mut state, stun(Coord::new(3, 3))),
            MoveOutcome::Rejected(MoveRejection::NoCardAtTarget)
        );

        let shield = MoveRequest::manual(
            p(1),
            DragItem::Counter {
                status: StatusKind::Shield,
                count: 1,
            },
            DropTarget::Board {
                coord: Coord::new(2, 2),
            },
        );
        assert_eq!(
            move_item(&mut state, shield),
            MoveOutcome::Rejected(MoveRejection::UnknownCounter)
        );
    }

    #[test]
    fn test_spotter_scores_on_revealed_entry() {
        let mut state = game();
        let s1 = add_to_hand(&mut state, p(1), "spotter");
        let s2 = add_to_hand(&mut state, p(1), "unit");
        assert!(play(&mut state, p(1), s1, Coord::new(2, 2)).is_moved());
        assert!(play(&mut state, p(1), s2, Coord::new(2, 3)).is_moved());

        let hidden = add_to_hand(&mut state, p(2), "unit");
        let revealed = add_to_hand(&mut state, p(2), "unit");
        state
            .get_player_mut(p(2))
            .unwrap()
            .hand
            .get_mut(revealed)
            .unwrap()
            .statuses
            .push(StatusKind::Revealed, p(1));

        assert!(play(&mut state, p(2), hidden, Coord::new(4, 4)).is_moved());
        assert_eq!(owner_player(&state, p(1)).score, 0);
        assert!(play(&mut state, p(2), revealed, Coord::new(5, 5)).is_moved());
        assert_eq!(owner_player(&state, p(1)).score, 2);
        assert!(state
            .take_events()
            .iter()
            .any(|e| matches!(e, GameEvent::Scored { amount: 2, .. })));
    }

    #[test]
    fn test_swap_and_spawn() {
        let mut state = game();
        let a = add_to_hand(&mut state, p(1), "unit");
        assert!(play(&mut state, p(1), a, Coord::new(2, 2)).is_moved());
        assert!(swap_cells(&mut state, Coord::new(2, 2), Coord::new(2, 3)));
        assert_eq!(state.board.find_card(a), Some(Coord::new(2, 3)));

        let token = spawn_card(&mut state, &"unit".into(), p(2), Coord::new(2, 2)).unwrap();
        assert_eq!(state.board.find_card(token), Some(Coord::new(2, 2)));
        assert!(spawn_card(&mut state, &"unit".into(), p(2), Coord::new(2, 2)).is_none());
        assert!(spawn_card(&mut state, &"missing".into(), p(2), Coord::new(4, 4)).is_none());
    }
}
